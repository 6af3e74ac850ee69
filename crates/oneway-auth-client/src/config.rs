//! Auth provider client configuration.
//!
//! Points the client at the hosted project's base URL. Override via
//! environment variables or explicit construction for testing.

use url::Url;

/// Configuration for connecting to the hosted auth provider.
///
/// Custom `Debug` implementation redacts the `service_key` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct AuthProviderConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`.
    pub base_url: Url,
    /// Service key sent as `apikey` on every request.
    pub service_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AuthProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthProviderConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AuthProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SUPABASE_URL` (required)
    /// - `SUPABASE_SERVICE_KEY` (required)
    /// - `SUPABASE_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which resolves a variable name
    /// to its value. [`from_env`](Self::from_env) reads the process
    /// environment this way.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("SUPABASE_URL").ok_or(ConfigError::MissingUrl)?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("SUPABASE_URL".to_string(), e.to_string()))?;
        let service_key = lookup("SUPABASE_SERVICE_KEY").ok_or(ConfigError::MissingKey)?;

        Ok(Self {
            base_url,
            service_key,
            timeout_secs: lookup("SUPABASE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    pub fn local_mock(uri: &str, key: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(uri)
            .map_err(|e| ConfigError::InvalidUrl(uri.to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            service_key: key.to_string(),
            timeout_secs: 5,
        })
    }

    /// Absolute URL of an auth endpoint, e.g. `endpoint("token")`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/auth/v1/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SUPABASE_URL environment variable is required")]
    MissingUrl,
    #[error("SUPABASE_SERVICE_KEY environment variable is required")]
    MissingKey,
    #[error("SUPABASE_SERVICE_KEY contains characters not allowed in a header")]
    InvalidKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
