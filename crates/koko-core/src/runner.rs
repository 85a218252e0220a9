//! The tool-call loop: repeated gateway calls with sequential tool dispatch.

use crate::error::KokoCoreError;
use crate::sessions::SessionStore;
use koko_gateway::{ModelGateway, ToolChoice};
use koko_protocol::{Message, Role, SessionId, ToolCall};
use koko_tools::{ToolContext, ToolRegistry};
use log::{debug, info, warn};
use serde_json::{Value, json};
use std::sync::Arc;

/// Upper bound on tool-call rounds per turn.
pub const MAX_TOOL_ROUNDS: usize = 6;

/// Canned reply when even the forced final call yields no text.
pub const FALLBACK_MESSAGE: &str =
    "I gathered data but could not form a final answer. Please try rephrasing your question.";

/// Instruction appended before the forced, tool-disabled final call.
const FORCED_FINAL_INSTRUCTION: &str =
    "Answer the user's question now, strictly from the tool results above. \
     Do not request any more tool calls.";

/// Runs one user turn to completion against the gateway and tool registry.
pub struct TurnRunner {
    gateway: Arc<dyn ModelGateway>,
    tools: ToolRegistry,
    max_rounds: usize,
}

impl TurnRunner {
    /// Build a runner over a gateway and tool registry.
    pub fn new(gateway: Arc<dyn ModelGateway>, tools: ToolRegistry) -> Self {
        Self {
            gateway,
            tools,
            max_rounds: MAX_TOOL_ROUNDS,
        }
    }

    /// Run one turn: append the user message, loop through tool rounds, and
    /// return the final assistant text.
    ///
    /// Every tool result is appended to the session before the next round so
    /// the model sees cumulative evidence. Tool failures become error result
    /// objects, never an abort; only gateway failures end the turn early.
    pub async fn run(
        &self,
        store: &SessionStore,
        session_id: SessionId,
        user_message: &str,
    ) -> Result<String, KokoCoreError> {
        store.append(session_id, Message::text(Role::User, user_message))?;
        let decls = self.tools.decls();
        let ctx = ToolContext::new(session_id, user_message);

        for round in 1..=self.max_rounds {
            let transcript = store.transcript(session_id)?;
            let reply = self
                .gateway
                .complete(&transcript, &decls, ToolChoice::Auto)
                .await?;

            if !reply.has_tool_calls() {
                if let Some(text) = reply.final_text() {
                    let text = text.to_string();
                    info!(
                        "turn finalized (session_id={}, rounds={}, reply_len={})",
                        session_id,
                        round,
                        text.len()
                    );
                    store.append(session_id, Message::text(Role::Assistant, &text))?;
                    return Ok(text);
                }
                // Tool-free reply with no text: fall through to the forced
                // final call rather than spinning on empty replies.
                warn!(
                    "empty reply without tool calls (session_id={}, round={})",
                    session_id, round
                );
                break;
            }

            debug!(
                "executing tool round (session_id={}, round={}, calls={})",
                session_id,
                round,
                reply.tool_calls.len()
            );
            let mut assistant = Message::assistant_tool_calls(reply.tool_calls.clone());
            assistant.content = reply.text.clone();
            store.append(session_id, assistant)?;

            // Strictly sequential, in the order the model returned them.
            for call in &reply.tool_calls {
                let result = self.dispatch(&ctx, call).await;
                store.append(session_id, Message::tool_result(&call.id, &result))?;
            }
        }

        self.forced_final(store, session_id).await
    }

    /// One extra call with tools disabled, then the canned fallback.
    async fn forced_final(
        &self,
        store: &SessionStore,
        session_id: SessionId,
    ) -> Result<String, KokoCoreError> {
        info!(
            "round limit exhausted, forcing final answer (session_id={})",
            session_id
        );
        store.append(
            session_id,
            Message::text(Role::System, FORCED_FINAL_INSTRUCTION),
        )?;
        let transcript = store.transcript(session_id)?;
        let reply = self
            .gateway
            .complete(&transcript, &[], ToolChoice::None)
            .await?;

        let text = match reply.final_text() {
            Some(text) => text.to_string(),
            None => {
                warn!(
                    "forced final call yielded no text (session_id={})",
                    session_id
                );
                FALLBACK_MESSAGE.to_string()
            }
        };
        store.append(session_id, Message::text(Role::Assistant, &text))?;
        Ok(text)
    }

    /// Execute one tool call, turning every failure into an error object.
    async fn dispatch(&self, ctx: &ToolContext, call: &ToolCall) -> Value {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!("tool not found (name={})", call.name);
            return json!({ "error": format!("tool not found: {}", call.name) });
        };
        match tool.call(ctx, call.arguments.clone()).await {
            Ok(result) => result,
            Err(err) => {
                warn!("tool failed (name={}): {}", call.name, err);
                json!({ "error": err.to_string() })
            }
        }
    }
}
