//! # HTTP Front Door
//!
//! Wires the three resource handlers under their path prefixes, applies the
//! permissive cross-origin policy and request tracing, and runs the serve
//! loop.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/products/*` - Product CRUD (multipart for create/update)
//! - `/api/batches/*` - Batch production CRUD + identification lookup
//! - `/api/access-logs/*` - Access log CRUD
//! - `/api/external/*` - Optional gateway (only when configured)

pub mod access_logs;
pub mod batches;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod products;
pub mod proxy;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{AppConfig, ProxyConfig};

/// Process-scoped resources shared by every handler. Holds only the pool;
/// handlers keep no state between requests.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Startup failures of the HTTP front door
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build the external gateway client: {0}")]
    Gateway(#[from] reqwest::Error),
}

/// Build the complete application router
pub fn router(state: AppState, proxy: Option<&ProxyConfig>) -> Result<Router, reqwest::Error> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api/products", products::routes())
        .nest("/api/batches", batches::routes())
        .nest("/api/access-logs", access_logs::routes())
        .with_state(state);

    if let Some(config) = proxy {
        router = router.merge(proxy::routes(config)?);
    }

    Ok(router.layer(cors).layer(TraceLayer::new_for_http()))
}

/// Bind the listener and serve until shutdown
pub async fn serve(config: &AppConfig, pool: PgPool) -> Result<(), ServeError> {
    let router = router(AppState { pool }, config.proxy.as_ref())?;

    let addr = config.http.socket_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router).await?;
    Ok(())
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::db;

    #[tokio::test]
    async fn test_router_builds_without_proxy() {
        let pool = db::connect(&DbConfig::default());
        let router = router(AppState { pool }, None);
        assert!(router.is_ok());
    }

    #[tokio::test]
    async fn test_router_builds_with_proxy() {
        let pool = db::connect(&DbConfig::default());
        let proxy = ProxyConfig {
            upstream: "https://gateway.example.com".to_string(),
            accept_invalid_certs: false,
        };
        let router = router(AppState { pool }, Some(&proxy));
        assert!(router.is_ok());
    }
}
