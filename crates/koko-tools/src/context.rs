//! Tool execution context.

use koko_protocol::SessionId;
use uuid::Uuid;

/// Per-turn context passed to every tool call.
///
/// Carries the raw user utterance so the SQL rewriter can react to what the
/// user actually asked for, not only to what the model generated.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Session the turn belongs to.
    pub session_id: SessionId,
    /// The user message that started this turn.
    pub utterance: String,
}

impl ToolContext {
    /// Build a context for a session and user utterance.
    pub fn new(session_id: SessionId, utterance: impl Into<String>) -> Self {
        Self {
            session_id,
            utterance: utterance.into(),
        }
    }
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            session_id: Uuid::nil(),
            utterance: String::new(),
        }
    }
}
