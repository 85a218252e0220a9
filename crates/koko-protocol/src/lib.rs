//! Wire types shared between the Koko gateway, tools, and server.

mod tool;

pub use tool::ToolError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for a chat session.
pub type SessionId = Uuid;
/// Unique identifier for a turn.
pub type TurnId = Uuid;

/// Speaker role for a transcript message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-generated message.
    System,
    /// User-authored message.
    User,
    /// Assistant-authored message.
    Assistant,
    /// Tool-result message fed back to the model.
    Tool,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// Message stored in a conversation transcript and sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role that produced the message.
    pub role: Role,
    /// Message content; absent on assistant turns that only carry tool calls.
    pub content: Option<String>,
    /// Tool calls requested by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Call id this tool-result message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Timestamp for the message.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a plain-text message for a role.
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
            created_at: Utc::now(),
        }
    }

    /// Build an assistant message carrying tool call requests.
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            tool_calls,
            tool_call_id: None,
            created_at: Utc::now(),
        }
    }

    /// Build a tool-result message answering a call id.
    pub fn tool_result(call_id: impl Into<String>, payload: &Value) -> Self {
        Self {
            role: Role::Tool,
            content: Some(payload.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
            created_at: Utc::now(),
        }
    }
}

/// A tool invocation requested by the model.
///
/// The id is opaque and assigned by the model API; it only has to survive
/// one loop round so the result can be associated back to the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Opaque call id assigned by the model.
    pub id: String,
    /// Name of the declared tool to invoke.
    pub name: String,
    /// JSON argument payload.
    pub arguments: Value,
}

/// A tool declaration advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDecl {
    /// Tool name.
    pub name: String,
    /// Tool description shown to the model.
    pub description: String,
    /// JSON schema for the tool arguments.
    pub parameters: Value,
}

/// One frame of the `/chat_stream` event stream.
///
/// Frames serialize to the shapes the browser client expects:
/// `{"delta": "..."}` for content slices and `{"done": true}` as the
/// completion marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StreamFrame {
    /// A slice of the final response text.
    Delta { delta: String },
    /// Completion marker; always the last frame.
    Done { done: bool },
}

impl StreamFrame {
    /// Build a delta frame from a text slice.
    pub fn delta(delta: impl Into<String>) -> Self {
        StreamFrame::Delta {
            delta: delta.into(),
        }
    }

    /// Build the completion marker frame.
    pub fn done() -> Self {
        StreamFrame::Done { done: true }
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, Role, StreamFrame, ToolCall};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_value(Role::System).expect("serialize"), json!("system"));
        assert_eq!(serde_json::to_value(Role::Tool).expect("serialize"), json!("tool"));
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn tool_result_message_carries_call_id() {
        let message = Message::tool_result("call_7", &json!({ "rows": [] }));
        assert_eq!(message.role, Role::Tool);
        assert_eq!(message.tool_call_id, Some("call_7".to_string()));
        assert_eq!(message.content, Some("{\"rows\":[]}".to_string()));
    }

    #[test]
    fn stream_frames_serialize_to_client_shapes() {
        let delta = serde_json::to_value(StreamFrame::delta("hi")).expect("serialize");
        assert_eq!(delta, json!({ "delta": "hi" }));

        let done = serde_json::to_value(StreamFrame::done()).expect("serialize");
        assert_eq!(done, json!({ "done": true }));
    }

    #[test]
    fn tool_call_round_trips_through_json() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "query_sql".to_string(),
            arguments: json!({ "query": "SELECT 1" }),
        };
        let encoded = serde_json::to_value(&call).expect("serialize");
        let decoded: ToolCall = serde_json::from_value(encoded).expect("deserialize");
        assert_eq!(decoded, call);
    }
}
