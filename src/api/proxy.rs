//! # External Gateway
//!
//! Optional pass-through for requests under `/api/external/` to a configured
//! upstream origin. The routes only exist when an upstream is configured,
//! and TLS certificate validation stays on unless explicitly disabled.

use axum::body::{to_bytes, Body};
use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use thiserror::Error;
use tracing::warn;

use super::envelope::Envelope;
use crate::config::ProxyConfig;

/// Forwarded request bodies are buffered; cap them at 25 MiB.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
struct ProxyState {
    client: reqwest::Client,
    upstream: String,
}

#[derive(Debug, Error)]
enum ProxyError {
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("upstream call failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("failed to assemble response: {0}")]
    Response(#[from] axum::http::Error),
}

/// Create the gateway routes for the configured upstream
pub fn routes(config: &ProxyConfig) -> Result<Router, reqwest::Error> {
    if config.accept_invalid_certs {
        warn!("TLS certificate validation disabled for the external gateway");
    }

    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?;

    let state = ProxyState {
        client,
        upstream: config.upstream.trim_end_matches('/').to_string(),
    };

    Ok(Router::new()
        .route("/api/external/{*path}", any(forward))
        .with_state(state))
}

async fn forward(
    State(state): State<ProxyState>,
    Path(path): Path<String>,
    req: Request,
) -> Response {
    match forward_inner(&state, &path, req).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, path, "external gateway request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(Envelope::fail("Upstream request failed")),
            )
                .into_response()
        }
    }
}

async fn forward_inner(
    state: &ProxyState,
    path: &str,
    req: Request,
) -> Result<Response, ProxyError> {
    let method = req.method().clone();

    let mut url = format!("{}/{}", state.upstream, path);
    if let Some(query) = req.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    // Forward headers as-is apart from Host (the client sets it for the
    // upstream) and Content-Length (recomputed for the buffered body).
    let mut headers = req.headers().clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    let body = to_bytes(req.into_body(), MAX_BODY_BYTES).await?;

    let upstream = state
        .client
        .request(method, url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let mut builder = Response::builder().status(upstream.status());
    for (name, value) in upstream.headers() {
        if name != &header::TRANSFER_ENCODING && name != &header::CONNECTION {
            builder = builder.header(name, value);
        }
    }

    let bytes = upstream.bytes().await?;
    Ok(builder.body(Body::from(bytes))?)
}
