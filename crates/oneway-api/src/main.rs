//! # oneway-api -- Binary Entry Point
//!
//! Starts the Axum HTTP server for the Oneway API.
//! Binds to configurable port (default 3000).

use oneway_api::state::{AppConfig, AppState};
use oneway_auth_client::{AuthProviderClient, AuthProviderConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let config = AppConfig::from_env();

    // The provider is mandatory: without it no request can be authorized.
    let provider_config = AuthProviderConfig::from_env().map_err(|e| {
        tracing::error!("Auth provider not configured: {e}");
        e
    })?;
    tracing::info!(base_url = %provider_config.base_url, "auth provider configured");
    let client = AuthProviderClient::new(provider_config).map_err(|e| {
        tracing::error!("Failed to create auth provider client: {e}");
        e
    })?;

    let port = config.port;
    if config.secure_cookies {
        tracing::info!("production mode: session cookies are Secure");
    }
    let app = oneway_api::app(AppState::new(client, config));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Oneway API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
