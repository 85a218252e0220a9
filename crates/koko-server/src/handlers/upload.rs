//! The `/upload_doc` endpoint.

use crate::error::ApiError;
use crate::extract::extract_text;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Multipart, State};
use log::info;
use serde_json::{Value, json};

/// `POST /upload_doc` — extract text from an uploaded document and inject it
/// into the shared conversation as context.
pub async fn upload_doc(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::validation(format!("invalid multipart body: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::validation(format!("failed to read upload: {err}")))?;
        if bytes.is_empty() {
            return Err(ApiError::validation("uploaded file is empty"));
        }
        if bytes.len() > state.config.uploads.max_bytes {
            return Err(ApiError::validation("uploaded file is too large"));
        }

        let text = extract_text(&filename, &bytes)?;
        let characters = text.chars().count();
        let session_id = state.sessions.default_session();
        state.sessions.inject_note(
            session_id,
            format!("The user uploaded a document named '{filename}'. Its contents:\n\n{text}"),
        )?;
        info!(
            "document injected (filename={}, characters={})",
            filename, characters
        );
        let message = format!("Document '{filename}' uploaded. Ask me anything about it!");
        return Ok(Json(json!({
            "filename": filename,
            "characters": characters,
            "message": message,
        })));
    }
    Err(ApiError::validation("missing multipart field 'file'"))
}
