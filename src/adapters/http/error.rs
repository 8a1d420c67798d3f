//! Error responses for the HTTP adapter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::ChatError;

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Wraps `ChatError` so it can be returned from axum handlers.
#[derive(Debug)]
pub struct ApiError(pub ChatError);

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ChatError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatError::Unauthorized => StatusCode::FORBIDDEN,
            ChatError::FriendLimitReached { .. } => StatusCode::FORBIDDEN,
            ChatError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ChatError::InvalidRole => StatusCode::BAD_REQUEST,
            ChatError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ChatError::CompletionUnavailable(_) => StatusCode::BAD_GATEWAY,
            ChatError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        let body = ErrorResponse::new(self.0.code().to_string(), self.0.to_string());
        (status, Json(body)).into_response()
    }
}
