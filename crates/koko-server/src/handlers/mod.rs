//! Request handlers for the Koko API.

pub mod admin;
pub mod chat;
pub mod memories;
pub mod sheet;
pub mod upload;

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::warn;

/// Gate requests behind `X-API-Key` when a server key is configured.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.server.api_key.as_deref() else {
        return next.run(request).await;
    };
    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if provided != expected {
        warn!("rejected request with missing or wrong API key");
        return ApiError::Unauthorized.into_response();
    }
    next.run(request).await
}
