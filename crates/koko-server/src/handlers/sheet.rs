//! The `/load_sheet` endpoint.

use crate::error::ApiError;
use crate::extract::sheet_export_url;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

/// Body of a load-sheet request.
#[derive(Debug, Deserialize)]
pub struct LoadSheetRequest {
    /// Public Google Sheets link.
    pub url: String,
}

/// `POST /load_sheet` — fetch a public spreadsheet as CSV and inject it into
/// the shared conversation as context.
pub async fn load_sheet(
    State(state): State<AppState>,
    Json(request): Json<LoadSheetRequest>,
) -> Result<Json<Value>, ApiError> {
    let export_url = sheet_export_url(&request.url)?;
    let response = state
        .http
        .get(&export_url)
        .send()
        .await
        .map_err(|err| ApiError::Internal(format!("failed to fetch sheet: {err}")))?;
    if !response.status().is_success() {
        return Err(ApiError::Internal(format!(
            "sheet fetch returned status {}",
            response.status().as_u16()
        )));
    }
    let csv = response
        .text()
        .await
        .map_err(|err| ApiError::Internal(format!("failed to read sheet body: {err}")))?;

    let rows = csv.lines().count();
    let characters = csv.chars().count();
    let session_id = state.sessions.default_session();
    state.sessions.inject_note(
        session_id,
        format!("The user loaded a spreadsheet as CSV. Its contents:\n\n{csv}"),
    )?;
    info!("sheet injected (rows={}, characters={})", rows, characters);
    Ok(Json(json!({
        "rows": rows,
        "characters": characters,
        "message": "Spreadsheet loaded. Ask me anything about it!",
    })))
}
