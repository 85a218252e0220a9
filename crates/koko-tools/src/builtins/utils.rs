//! Shared helpers for built-in tools.

use koko_protocol::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode tool arguments into a typed struct.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|err| ToolError::InvalidArguments(err.to_string()))
}
