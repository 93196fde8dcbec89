//! HTTP gateway: one conversion endpoint over the [`Converter`].
//!
//! ```text
//! POST /convert   {"path": "<file path or URL>"}
//!   200 {"markdown": "..."}
//!   400 {"error": "Missing path in request"}   no conversion attempted
//!   500 {"error": "<failure message>"}         any conversion failure
//! GET  /health    {"status": "ok", "version": "..."}
//! ```
//!
//! Requests are independent. The only shared state is the converter itself,
//! which is immutable.

use crate::config::ServerConfig;
use crate::convert::Converter;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Message returned when the request carries no usable `path`.
pub const MISSING_PATH: &str = "Missing path in request";

/// Body of `POST /convert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub path: Option<String>,
}

/// Successful `POST /convert` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub markdown: String,
}

/// Error response for every non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Build the gateway router around `converter`.
pub fn build_router(converter: Arc<Converter>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/convert", post(convert_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(converter)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn convert_handler(
    State(converter): State<Arc<Converter>>,
    body: Result<Json<ConvertRequest>, JsonRejection>,
) -> Response {
    let path = match body {
        Ok(Json(ConvertRequest { path: Some(path) })) if !path.trim().is_empty() => path,
        Ok(_) => return error_response(StatusCode::BAD_REQUEST, MISSING_PATH),
        Err(rejection) => {
            warn!("Rejected convert request: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, MISSING_PATH);
        }
    };

    match converter.convert(&path).await {
        Ok(output) => Json(ConvertResponse {
            markdown: output.markdown,
        })
        .into_response(),
        Err(e) => {
            error!(
                reference = %path,
                kind = ?e.kind(),
                error = ?e,
                "Conversion failed: {}",
                e
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Bind `config.bind` and serve until Ctrl-C.
pub async fn serve(config: ServerConfig, converter: Converter) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("doc2md gateway listening on {}", listener.local_addr()?);
    serve_on(listener, converter).await
}

/// Serve on an already-bound listener until Ctrl-C.
pub async fn serve_on(
    listener: tokio::net::TcpListener,
    converter: Converter,
) -> Result<(), std::io::Error> {
    let app = build_router(Arc::new(converter));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
