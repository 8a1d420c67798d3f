//! Caller identity as produced by the `SessionValidator` port.

use super::UserId;
use thiserror::Error;

/// The claims the chat pipeline reads from a bearer token.
///
/// `display_name` seeds the account's profile name on first sign-in and is
/// what the friends call the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: Option<String>, display_name: Option<String>) -> Self {
        Self {
            id,
            email,
            display_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Missing, malformed, or wrongly signed.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// The validator itself could not run (bad key material, provider down).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_error_carries_reason() {
        let err = AuthError::service_unavailable("Connection refused");
        assert_eq!(err.to_string(), "Auth service unavailable: Connection refused");
    }

    #[test]
    fn optional_claims_may_be_absent() {
        let user = AuthenticatedUser::new(UserId::new("u-1").unwrap(), None, None);
        assert!(user.email.is_none());
        assert!(user.display_name.is_none());
    }
}
