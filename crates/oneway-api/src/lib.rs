//! # oneway-api -- Axum API Service for the Oneway Marketplace
//!
//! A thin REST layer over the hosted identity provider. The one piece of
//! real logic is the session gate ([`auth`]): every protected request is
//! checked against the provider and, when only the refresh token is still
//! valid, the session is renewed in place and the refresh cookie rotated.
//!
//! ## API Surface
//!
//! | Prefix        | Module                | Domain                  |
//! |---------------|-----------------------|-------------------------|
//! | `/`           | this module           | Welcome / version       |
//! | `/health/*`   | this module           | Liveness and readiness  |
//! | `/auth/*`     | [`routes::auth`]      | Sessions and accounts   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → [session gate on protected routes] → Handler
//! ```

pub mod auth;
pub mod context;
pub mod cookies;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::http::Uri;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use oneway_core::SessionStore;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes and the welcome route are open; protected auth routes run
/// behind the session gate. Unknown paths get a JSON 404.
pub fn app<S: SessionStore>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(welcome))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(routes::auth::router(state.clone()))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /: Service banner.
async fn welcome() -> impl IntoResponse {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "message": "Welcome to Oneway API",
    }))
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

async fn not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "route not found");
    AppError::NotFound("Route not found".into())
}
