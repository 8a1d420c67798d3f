//! Provisions an account the first time a user is seen.

use std::sync::Arc;
use tracing::info;

use crate::application::ChatError;
use crate::domain::foundation::{AuthenticatedUser, Timestamp};
use crate::domain::quota::QuotaPolicy;
use crate::domain::user::UserAccount;
use crate::ports::{RepositoryError, UserRepository};

pub struct EnsureUserHandler {
    users: Arc<dyn UserRepository>,
    policy: QuotaPolicy,
}

impl EnsureUserHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            policy: QuotaPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: QuotaPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the stored account, creating a free-tier one if absent.
    pub async fn handle(&self, caller: &AuthenticatedUser) -> Result<UserAccount, ChatError> {
        if let Some(existing) = self.users.find_by_id(&caller.id).await? {
            return Ok(existing);
        }

        let account = UserAccount::provision(
            caller.id.clone(),
            caller.display_name.clone(),
            Timestamp::now(),
            &self.policy,
        );

        match self.users.create(&account).await {
            Ok(()) => {
                info!(user_id = %account.id, "Provisioned user");
                Ok(account)
            }
            // A concurrent request got there first.
            Err(RepositoryError::Conflict(_)) => self
                .users
                .find_by_id(&caller.id)
                .await?
                .ok_or_else(|| ChatError::user_not_found(&caller.id)),
            Err(e) => Err(e.into()),
        }
    }
}
