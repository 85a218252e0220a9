use async_trait::async_trait;
use koko_protocol::ToolError;
use koko_tools::{Tool, ToolContext};
use serde_json::{Value, json};

/// Tool echoing its arguments back as the result.
#[derive(Debug, Default, Clone)]
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "echoes its arguments"
    }

    fn args_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        Ok(json!({ "echo": args, "utterance": ctx.utterance }))
    }
}

/// Tool that always fails.
#[derive(Debug, Default, Clone)]
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "always fails"
    }

    fn args_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _ctx: &ToolContext, _args: Value) -> Result<Value, ToolError> {
        Err(ToolError::ExecutionFailed("boom".to_string()))
    }
}
