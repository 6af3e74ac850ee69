//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Holds nothing mutable: the session store
//! client behind an `Arc` and the immutable [`AppConfig`].

use std::sync::Arc;

use oneway_core::SessionStore;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Mark session cookies `Secure`. On in production.
    pub secure_cookies: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            secure_cookies: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 3000)
    /// - `APP_ENV` or `NODE_ENV`; `production` turns on secure cookies
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which resolves a variable name
    /// to its value. `APP_ENV` wins over `NODE_ENV` when both are set.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let environment = lookup("APP_ENV")
            .or_else(|| lookup("NODE_ENV"))
            .unwrap_or_default();

        Self {
            port,
            secure_cookies: environment.eq_ignore_ascii_case("production"),
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug)]
pub struct AppState<S> {
    /// Identity provider every session question is delegated to.
    pub store: Arc<S>,
    /// Immutable configuration.
    pub config: AppConfig,
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: SessionStore> AppState<S> {
    /// Create state around a session store.
    pub fn new(store: S, config: AppConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn node_env_production_turns_on_secure_cookies() {
        let cfg = AppConfig::from_vars(vars(&[("NODE_ENV", "production"), ("PORT", "8080")]));
        assert!(cfg.secure_cookies);
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn app_env_takes_precedence_over_node_env() {
        let cfg = AppConfig::from_vars(vars(&[("APP_ENV", "staging"), ("NODE_ENV", "production")]));
        assert!(!cfg.secure_cookies);
        let cfg = AppConfig::from_vars(vars(&[("APP_ENV", "Production"), ("NODE_ENV", "development")]));
        assert!(cfg.secure_cookies);
    }

    #[test]
    fn unset_or_bad_values_fall_back_to_defaults() {
        let cfg = AppConfig::from_vars(vars(&[("PORT", "not-a-port")]));
        assert_eq!(cfg.port, 3000);
        assert!(!cfg.secure_cookies);
    }

    #[test]
    fn default_config_is_not_secure() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port, 3000);
        assert!(!cfg.secure_cookies);
    }
}
