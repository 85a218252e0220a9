//! Tool trait definition.

use crate::context::ToolContext;
use async_trait::async_trait;
use koko_protocol::{ToolDecl, ToolError};
use serde_json::Value;
use std::fmt::Debug;

/// Interface for model-invocable tools.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Return the tool name.
    fn name(&self) -> &str;
    /// Return the tool description shown to the model.
    fn description(&self) -> &str;
    /// Return the JSON schema for tool arguments.
    fn args_schema(&self) -> Value;

    /// Invoke the tool with a context and arguments.
    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError>;

    /// Build the declaration advertised to the model.
    fn decl(&self) -> ToolDecl {
        ToolDecl {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.args_schema(),
        }
    }
}
