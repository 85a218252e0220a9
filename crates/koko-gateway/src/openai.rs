//! OpenAI-compatible chat-completions client.

use crate::{GatewayError, ModelGateway, ModelReply, ToolChoice};
use async_trait::async_trait;
use koko_config::ModelConfig;
use koko_protocol::{Message, ToolCall, ToolDecl};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat-completions path under the API base URL.
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiGateway {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiGateway {
    /// Build a gateway from the model configuration.
    pub fn new(config: &ModelConfig) -> Result<Self, GatewayError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or(GatewayError::MissingApiKey)?;
        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.name.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH)
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDecl],
        tool_choice: ToolChoice,
    ) -> Result<ModelReply, GatewayError> {
        debug!(
            "sending chat completion (model={}, messages={}, tools={}, tool_choice={})",
            self.model,
            messages.len(),
            tools.len(),
            tool_choice.as_str()
        );
        let request = ChatCompletionRequest::build(
            &self.model,
            self.max_tokens,
            messages,
            tools,
            tool_choice,
        );
        let response = self
            .client
            .post(self.chat_completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = match response.text().await {
                Ok(text) => text,
                Err(err) => format!("unable to read error body: {err}"),
            };
            return Err(GatewayError::HttpStatus {
                status,
                message: extract_error_message(&body),
            });
        }

        let decoded: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::ResponseParse(err.to_string()))?;
        normalize_response(decoded)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<RequestMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<RequestToolDecl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    max_tokens: u32,
}

impl ChatCompletionRequest {
    fn build(
        model: &str,
        max_tokens: u32,
        messages: &[Message],
        tools: &[ToolDecl],
        tool_choice: ToolChoice,
    ) -> Self {
        let tools: Vec<RequestToolDecl> = tools.iter().map(RequestToolDecl::from).collect();
        let tool_choice =
            (!tools.is_empty()).then(|| tool_choice.as_str().to_string());
        Self {
            model: model.to_string(),
            messages: messages.iter().map(RequestMessage::from).collect(),
            tools,
            tool_choice,
            max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<RequestToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&Message> for RequestMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: message.content.clone(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(RequestToolCall::from)
                .collect(),
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: RequestFunction,
}

impl From<&ToolCall> for RequestToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            kind: "function",
            function: RequestFunction {
                name: call.name.clone(),
                arguments: call.arguments.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct RequestToolDecl {
    #[serde(rename = "type")]
    kind: &'static str,
    function: RequestFunctionDecl,
}

impl From<&ToolDecl> for RequestToolDecl {
    fn from(decl: &ToolDecl) -> Self {
        Self {
            kind: "function",
            function: RequestFunctionDecl {
                name: decl.name.clone(),
                description: decl.description.clone(),
                parameters: decl.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestFunctionDecl {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ResponseChoice>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ResponseToolCall>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull the human-readable message out of an API error body, falling back to
/// the raw body when it is not the standard envelope.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}

fn normalize_response(response: ChatCompletionResponse) -> Result<ModelReply, GatewayError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::ResponseParse("response contained no choices".to_string()))?;
    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| {
            if call.kind != "function" {
                return Err(GatewayError::ResponseParse(format!(
                    "unsupported tool call type `{}`",
                    call.kind
                )));
            }
            let arguments: Value =
                serde_json::from_str(&call.function.arguments).map_err(|err| {
                    GatewayError::ResponseParse(format!(
                        "invalid tool call arguments for `{}`: {err}",
                        call.id
                    ))
                })?;
            Ok(ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ModelReply {
        text: choice.message.content,
        tool_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        ChatCompletionRequest, ChatCompletionResponse, extract_error_message, normalize_response,
    };
    use crate::ToolChoice;
    use koko_protocol::{Message, Role, ToolCall, ToolDecl};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_tools() -> Vec<ToolDecl> {
        vec![ToolDecl {
            name: "query_sql".to_string(),
            description: "Run a read-only SQL query".to_string(),
            parameters: json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }),
        }]
    }

    #[test]
    fn request_serializes_to_chat_completions_shape() {
        let messages = vec![
            Message::text(Role::System, "You are Koko."),
            Message::text(Role::User, "hello"),
        ];
        let request = ChatCompletionRequest::build(
            "gpt-4.1",
            500,
            &messages,
            &sample_tools(),
            ToolChoice::Auto,
        );
        let encoded = serde_json::to_value(&request).expect("serialize");

        assert_eq!(encoded["model"], json!("gpt-4.1"));
        assert_eq!(encoded["max_tokens"], json!(500));
        assert_eq!(encoded["tool_choice"], json!("auto"));
        assert_eq!(encoded["messages"][0]["role"], json!("system"));
        assert_eq!(encoded["messages"][1]["content"], json!("hello"));
        assert_eq!(encoded["tools"][0]["type"], json!("function"));
        assert_eq!(encoded["tools"][0]["function"]["name"], json!("query_sql"));
    }

    #[test]
    fn request_omits_tool_choice_without_tools() {
        let messages = vec![Message::text(Role::User, "hi")];
        let request = ChatCompletionRequest::build("gpt-4.1", 500, &messages, &[], ToolChoice::Auto);
        let encoded = serde_json::to_value(&request).expect("serialize");
        assert!(encoded.get("tools").is_none());
        assert!(encoded.get("tool_choice").is_none());
    }

    #[test]
    fn request_encodes_tool_call_arguments_as_string() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "query_sql".to_string(),
            arguments: json!({ "query": "SELECT 1" }),
        };
        let messages = vec![
            Message::assistant_tool_calls(vec![call]),
            Message::tool_result("call_1", &json!({ "rows": [] })),
        ];
        let request = ChatCompletionRequest::build("gpt-4.1", 500, &messages, &[], ToolChoice::Auto);
        let encoded = serde_json::to_value(&request).expect("serialize");

        let arguments = encoded["messages"][0]["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .expect("string arguments");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(arguments).expect("json"),
            json!({ "query": "SELECT 1" })
        );
        assert_eq!(encoded["messages"][1]["role"], json!("tool"));
        assert_eq!(encoded["messages"][1]["tool_call_id"], json!("call_1"));
    }

    #[test]
    fn normalize_parses_text_reply() {
        let decoded: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Hi there." } }
            ]
        }))
        .expect("decode");
        let reply = normalize_response(decoded).expect("normalize");
        assert_eq!(reply.final_text(), Some("Hi there."));
        assert!(!reply.has_tool_calls());
    }

    #[test]
    fn normalize_parses_tool_calls_and_arguments() {
        let decoded: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {
                            "name": "get_schema",
                            "arguments": "{\"mode\": \"tables\"}"
                        }
                    }]
                }
            }]
        }))
        .expect("decode");
        let reply = normalize_response(decoded).expect("normalize");
        assert!(reply.has_tool_calls());
        assert_eq!(reply.tool_calls[0].name, "get_schema");
        assert_eq!(reply.tool_calls[0].arguments, json!({ "mode": "tables" }));
    }

    #[test]
    fn normalize_rejects_empty_choices_and_bad_arguments() {
        let decoded: ChatCompletionResponse =
            serde_json::from_value(json!({ "choices": [] })).expect("decode");
        assert!(normalize_response(decoded).is_err());

        let decoded: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "query_sql", "arguments": "not json" }
                    }]
                }
            }]
        }))
        .expect("decode");
        assert!(normalize_response(decoded).is_err());
    }

    #[test]
    fn extract_error_message_reads_envelope() {
        let body = r#"{"error": {"message": "invalid model", "type": "invalid_request_error"}}"#;
        assert_eq!(extract_error_message(body), "invalid model");
        assert_eq!(extract_error_message("plain failure"), "plain failure");
    }
}
