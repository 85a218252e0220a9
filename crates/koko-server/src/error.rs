//! API error type and HTTP status mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller-visible input problem; maps to 400.
    #[error("{0}")]
    Validation(String),
    /// API key missing or wrong; maps to 401.
    #[error("unauthorized")]
    Unauthorized,
    /// Anything else; maps to 500 with the message.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Build a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<koko_memory::MemoryError> for ApiError {
    fn from(err: koko_memory::MemoryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<koko_core::KokoCoreError> for ApiError {
    fn from(err: koko_core::KokoCoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<koko_db::DbError> for ApiError {
    fn from(err: koko_db::DbError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn statuses_match_the_error_taxonomy() {
        assert_eq!(
            ApiError::validation("bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
