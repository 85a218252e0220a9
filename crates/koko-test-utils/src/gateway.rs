use async_trait::async_trait;
use koko_gateway::{GatewayError, ModelGateway, ModelReply, ToolChoice};
use koko_protocol::{Message, ToolDecl};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// One recorded gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedCall {
    /// Number of transcript messages sent.
    pub message_count: usize,
    /// Number of tool declarations sent.
    pub tool_count: usize,
    /// Tool choice for the call.
    pub tool_choice: ToolChoice,
}

/// Gateway returning scripted replies and recording every call.
#[derive(Default)]
pub struct MockGateway {
    replies: Mutex<VecDeque<ModelReply>>,
    repeated: Option<ModelReply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    /// Return the given replies in order, then fail when exhausted.
    pub fn scripted(replies: impl IntoIterator<Item = ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            repeated: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Return the same reply on every call.
    pub fn repeating(reply: ModelReply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            repeated: Some(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Scripted replies first, then the repeated reply once they run out.
    pub fn scripted_then_repeating(
        replies: impl IntoIterator<Item = ModelReply>,
        repeated: ModelReply,
    ) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            repeated: Some(repeated),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDecl],
        tool_choice: ToolChoice,
    ) -> Result<ModelReply, GatewayError> {
        self.calls.lock().push(RecordedCall {
            message_count: messages.len(),
            tool_count: tools.len(),
            tool_choice,
        });
        if let Some(reply) = self.replies.lock().pop_front() {
            return Ok(reply);
        }
        match &self.repeated {
            Some(reply) => Ok(reply.clone()),
            None => Err(GatewayError::Transport("mock script exhausted".to_string())),
        }
    }
}
