//! Liveness endpoints.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

/// `GET /` — service identity probe.
pub async fn home() -> Json<Value> {
    Json(json!({ "status": "ok", "ai": "KOKO" }))
}

/// `GET /test_db` — database liveness probe returning the current DB time.
pub async fn test_db(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let db_time = state.database.current_time().await?;
    Ok(Json(json!({ "db_time": db_time })))
}
