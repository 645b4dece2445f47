use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::hook::Hook;
use super::signature::SIGNATURE_HEADER;
use crate::cache::Cache;
use crate::event::Coverage;
use crate::utils::error::{CacheError, HookError};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct WebState {
    pub hook: Arc<Hook>,
    pub cache: Arc<dyn Cache>,
}

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Error reply rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "resource not found".to_string(),
        }
    }
}

impl From<HookError> for ApiError {
    fn from(err: HookError) -> Self {
        let status = match err {
            HookError::Incomplete | HookError::Unverified => StatusCode::BAD_REQUEST,
            HookError::Broker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Routes:
///
/// ```text
/// GET  /            index page
/// POST /github      signed webhook delivery
/// GET  /api         package names with known coverage
/// GET  /api/*pkg    coverage of one package
/// ```
pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/github", post(receive_hook))
        .route("/api", get(list_coverage))
        .route("/api/*pkg", get(get_coverage))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn receive_hook(
    State(state): State<WebState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let outcome = state.hook.receive(signature, &body).await?;
    Ok(Json(MessageResponse {
        message: outcome.message(),
    }))
}

async fn list_coverage(State(state): State<WebState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.cache.keys()?))
}

async fn get_coverage(
    State(state): State<WebState>,
    Path(pkg): Path<String>,
) -> Result<Json<Coverage>, ApiError> {
    state
        .cache
        .get(&pkg)
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// Serves the HTTP API on `addr` until `shutdown` is cancelled.
pub async fn start_web_server(
    addr: &str,
    state: WebState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
