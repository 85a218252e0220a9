//! The `/memories` endpoints.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

/// Body of a save-memory request.
#[derive(Debug, Deserialize)]
pub struct SaveMemoryRequest {
    /// The fact to remember.
    pub text: String,
}

/// `GET /memories` — list all persisted entries.
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let memories = state.memory.list().await?;
    Ok(Json(json!({ "memories": memories })))
}

/// `POST /memories` — persist one entry and return it.
pub async fn save(
    State(state): State<AppState>,
    Json(request): Json<SaveMemoryRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::validation("text cannot be empty"));
    }
    let memory = state.memory.append(text).await?;
    info!("saved memory (text_len={})", text.len());
    Ok(Json(json!({ "memory": memory })))
}

/// `DELETE /memories` — clear all entries.
pub async fn clear(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let cleared = state.memory.clear().await?;
    Ok(Json(json!({ "cleared": cleared })))
}
