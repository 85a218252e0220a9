//! Error types for the core crate.

use koko_gateway::GatewayError;
use koko_protocol::SessionId;
use thiserror::Error;

/// Errors returned by session and turn operations.
#[derive(Debug, Error)]
pub enum KokoCoreError {
    /// Session id is unknown to the store.
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),
    /// Model gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
