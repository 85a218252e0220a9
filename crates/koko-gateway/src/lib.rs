//! Model gateway for Koko.
//!
//! Sends a conversation transcript plus a declared tool set to a hosted
//! OpenAI-compatible chat-completions endpoint and returns either plain text
//! or a list of requested tool invocations.

mod error;
mod openai;

pub use error::GatewayError;
pub use openai::OpenAiGateway;

use async_trait::async_trait;
use koko_protocol::{Message, ToolCall, ToolDecl};

/// Whether the model may request tool calls for a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to call tools.
    Auto,
    /// Tool use is disabled for this call.
    None,
}

impl ToolChoice {
    /// Wire value for the `tool_choice` request field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
        }
    }
}

/// One model reply: plain text, requested tool calls, or both.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    /// Assistant text, when present.
    pub text: Option<String>,
    /// Tool invocations the model requested, in returned order.
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    /// Whether this reply requests any tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Non-empty assistant text, when present.
    pub fn final_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Gateway abstraction over the hosted model API.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send the transcript and tool declarations, returning the model reply.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDecl],
        tool_choice: ToolChoice,
    ) -> Result<ModelReply, GatewayError>;
}
