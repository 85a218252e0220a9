//! Error types for database access.

use thiserror::Error;

/// Errors returned by the SQL guard, executor, and schema inspector.
#[derive(Debug, Error)]
pub enum DbError {
    /// The statement does not lexically begin with SELECT.
    #[error("only SELECT statements are allowed (got: {0})")]
    NotReadOnly(String),
    /// The statement contains a positional placeholder token.
    #[error("positional placeholders are not allowed (found: {0})")]
    Placeholder(String),
    /// A table or column name failed the identifier allow-list.
    #[error("unsafe identifier: {0}")]
    UnsafeIdentifier(String),
    /// An unknown schema inspection mode was requested.
    #[error("unknown schema mode: {0}")]
    UnknownMode(String),
    /// Opening the connection failed.
    #[error("database connection failed: {0}")]
    Connect(String),
    /// Running the query failed.
    #[error("query failed: {0}")]
    Query(String),
    /// Converting a row to JSON failed.
    #[error("failed to decode row: {0}")]
    Decode(String),
}
