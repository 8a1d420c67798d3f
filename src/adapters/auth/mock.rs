//! In-process session validator for tests and local runs.
//!
//! ```ignore
//! let validator = MockSessionValidator::new().with_test_user("token-alice", "alice");
//! let user = validator.validate("token-alice").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Fixed token table. Unknown tokens are `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    sessions: RwLock<HashMap<String, AuthenticatedUser>>,
    outage: RwLock<Option<String>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.sessions.write().unwrap().insert(token.into(), user);
        self
    }

    /// Registers `token` for a user whose display name is the capitalised id.
    pub fn with_test_user(self, token: impl Into<String>, user_id: &str) -> Self {
        let mut chars = user_id.chars();
        let display_name = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        let user = AuthenticatedUser::new(
            UserId::new(user_id).unwrap(),
            Some(format!("{}@example.com", user_id)),
            Some(display_name),
        );
        self.with_user(token, user)
    }

    /// Makes every validation fail with `ServiceUnavailable` until
    /// `end_outage` is called.
    pub fn start_outage(&self, reason: impl Into<String>) {
        *self.outage.write().unwrap() = Some(reason.into());
    }

    pub fn end_outage(&self) {
        *self.outage.write().unwrap() = None;
    }

    pub fn revoke(&self, token: &str) {
        self.sessions.write().unwrap().remove(token);
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(reason) = self.outage.read().unwrap().as_ref() {
            return Err(AuthError::service_unavailable(reason.clone()));
        }

        self.sessions
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_token_resolves_to_its_user() {
        let validator = MockSessionValidator::new().with_test_user("token-alice", "alice");

        let user = validator.validate("token-alice").await.unwrap();
        assert_eq!(user.id.as_str(), "alice");
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let validator = MockSessionValidator::new();
        assert_eq!(validator.validate("nope").await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn outage_fails_every_token_until_it_ends() {
        let validator = MockSessionValidator::new().with_test_user("token-alice", "alice");

        validator.start_outage("identity provider down");
        assert!(matches!(
            validator.validate("token-alice").await,
            Err(AuthError::ServiceUnavailable(_))
        ));

        validator.end_outage();
        assert!(validator.validate("token-alice").await.is_ok());
    }

    #[tokio::test]
    async fn revoked_token_stops_validating() {
        let validator = MockSessionValidator::new().with_test_user("token-alice", "alice");
        validator.revoke("token-alice");
        assert_eq!(
            validator.validate("token-alice").await,
            Err(AuthError::InvalidToken)
        );
    }
}
