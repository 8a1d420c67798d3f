//! Errors surfaced by the chat use cases.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, FriendId, MessageId, UserId, ValidationError};
use crate::ports::{AIError, RepositoryError};

/// Caller-facing failure taxonomy.
///
/// `CompletionUnavailable` means the backend never produced a usable reply
/// and nothing was stored. `Storage` means a write failed, possibly after a
/// reply was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("You do not have access to this resource")]
    Unauthorized,

    #[error("Daily message limit of {limit} reached")]
    QuotaExceeded { limit: u32 },

    #[error("Only assistant messages can be rolled back")]
    InvalidRole,

    #[error("Completion unavailable: {0}")]
    CompletionUnavailable(String),

    #[error("Friend limit of {limit} reached")]
    FriendLimitReached { limit: u32 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ChatError {
    pub fn friend_not_found(id: &FriendId) -> Self {
        Self::NotFound(format!("friend {}", id))
    }

    pub fn message_not_found(id: &MessageId) -> Self {
        Self::NotFound(format!("message {}", id))
    }

    pub fn user_not_found(id: &UserId) -> Self {
        Self::NotFound(format!("user {}", id))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::NotFound(what) if what.starts_with("friend") => ErrorCode::FriendNotFound,
            ChatError::NotFound(what) if what.starts_with("user") => ErrorCode::UserNotFound,
            ChatError::NotFound(_) => ErrorCode::MessageNotFound,
            ChatError::Unauthorized => ErrorCode::Unauthorized,
            ChatError::QuotaExceeded { .. } => ErrorCode::QuotaExceeded,
            ChatError::InvalidRole => ErrorCode::InvalidRole,
            ChatError::CompletionUnavailable(_) => ErrorCode::CompletionUnavailable,
            ChatError::FriendLimitReached { .. } => ErrorCode::FriendLimitReached,
            ChatError::Validation(_) => ErrorCode::ValidationFailed,
            ChatError::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<RepositoryError> for ChatError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => ChatError::NotFound(what),
            other => ChatError::Storage(other.to_string()),
        }
    }
}

impl From<AIError> for ChatError {
    fn from(err: AIError) -> Self {
        ChatError::CompletionUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes_follow_resource() {
        assert_eq!(
            ChatError::friend_not_found(&FriendId::new()).code(),
            ErrorCode::FriendNotFound
        );
        assert_eq!(
            ChatError::message_not_found(&MessageId::new()).code(),
            ErrorCode::MessageNotFound
        );
        assert_eq!(
            ChatError::user_not_found(&UserId::new("u").unwrap()).code(),
            ErrorCode::UserNotFound
        );
    }

    #[test]
    fn repository_not_found_stays_not_found() {
        let err: ChatError = RepositoryError::NotFound("friend abc".to_string()).into();
        assert_eq!(err.code(), ErrorCode::FriendNotFound);
    }

    #[test]
    fn database_failures_become_storage_errors() {
        let err: ChatError = RepositoryError::database("connection reset").into();
        assert!(matches!(err, ChatError::Storage(_)));
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }

    #[test]
    fn provider_errors_become_completion_unavailable() {
        let err: ChatError = AIError::EmptyResponse.into();
        assert_eq!(err.code(), ErrorCode::CompletionUnavailable);
    }

    #[test]
    fn validation_errors_are_transparent() {
        let err: ChatError = ValidationError::empty_field("content").into();
        assert_eq!(err.to_string(), "Field 'content' cannot be empty");
    }
}
