//! Session validation port.
//!
//! HTTP middleware hands the raw bearer token to this port and gets back the
//! caller's identity. Token issuance lives outside this service.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// Implementations must return `AuthError::InvalidToken` for malformed or
/// badly signed tokens, `AuthError::TokenExpired` for expired ones, and
/// `AuthError::ServiceUnavailable` for transient failures.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
