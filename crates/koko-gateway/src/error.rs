//! Error types for the model gateway.

use thiserror::Error;

/// Errors returned by model gateway calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No API key was configured or resolvable from the environment.
    #[error("model API key is not configured")]
    MissingApiKey,
    /// The request could not be sent.
    #[error("model transport error: {0}")]
    Transport(String),
    /// The API answered with a non-success status.
    #[error("model API returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    /// The response body could not be decoded.
    #[error("model response parse error: {0}")]
    ResponseParse(String),
}
