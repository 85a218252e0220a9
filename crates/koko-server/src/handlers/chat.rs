//! The `/chat_stream` endpoint.

use crate::error::ApiError;
use crate::state::AppState;
use crate::stream::emit_frames;
use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures_util::Stream;
use futures_util::StreamExt;
use koko_protocol::{SessionId, StreamFrame};
use log::{error, info};
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Body of a chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user message.
    pub message: String,
    /// Optional style hint folded into the message.
    #[serde(default)]
    pub tone: Option<String>,
    /// Optional session to isolate this conversation.
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

/// `POST /chat_stream` — run the turn and stream the answer as SSE frames.
///
/// The stream always terminates cleanly: failures inside the turn become a
/// single `[Server error] ...` delta followed by the done marker.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::validation("message cannot be empty"));
    }
    let session_id = state.sessions.resolve(request.session_id);
    let content = apply_tone(&request.message, request.tone.as_deref());
    info!(
        "chat request (session_id={}, message_len={}, tone_set={})",
        session_id,
        request.message.len(),
        request.tone.is_some()
    );

    let (tx, rx) = mpsc::channel::<StreamFrame>(64);
    let runner = state.runner.clone();
    let sessions = state.sessions.clone();
    let pacing = state.config.streaming.clone();
    tokio::spawn(async move {
        let text = match runner.run(&sessions, session_id, &content).await {
            Ok(text) => text,
            Err(err) => {
                error!("turn failed (session_id={}): {}", session_id, err);
                format!("[Server error] {err}")
            }
        };
        emit_frames(tx, &text, &pacing).await;
    });

    let stream = ReceiverStream::new(rx).map(|frame| {
        let data = serde_json::to_string(&frame)
            .unwrap_or_else(|_| "{\"done\":true}".to_string());
        Ok(Event::default().data(data))
    });
    Ok(Sse::new(stream))
}

/// Fold an optional tone hint into the user message so the model sees the
/// hint alongside the question.
fn apply_tone(message: &str, tone: Option<&str>) -> String {
    match tone.map(str::trim).filter(|tone| !tone.is_empty()) {
        Some(tone) => format!("{message}\n\n[Respond in a {tone} tone.]"),
        None => message.to_string(),
    }
}
