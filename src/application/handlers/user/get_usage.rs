//! GetUsage query handler.

use std::sync::Arc;

use crate::application::handlers::access::load_user;
use crate::application::ChatError;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::quota::QuotaPolicy;
use crate::domain::user::UsageInfo;
use crate::ports::UserRepository;

pub struct GetUsageHandler {
    users: Arc<dyn UserRepository>,
    policy: QuotaPolicy,
}

impl GetUsageHandler {
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

    /// Reads the quota position. A stale counter reads as reset but is not
    /// written back.
    pub async fn handle(&self, user_id: &UserId) -> Result<UsageInfo, ChatError> {
        let user = load_user(self.users.as_ref(), user_id).await?;
        Ok(user.usage(&self.policy, Timestamp::now()))
    }
}
