//! CreateFriend command handler.

use std::sync::Arc;
use tracing::info;

use crate::application::handlers::access::load_user;
use crate::application::ChatError;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::friend::{Friend, FriendProfile};
use crate::domain::quota::QuotaPolicy;
use crate::ports::{FriendRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct CreateFriendCommand {
    pub user_id: UserId,
    pub profile: FriendProfile,
}

pub struct CreateFriendHandler {
    friends: Arc<dyn FriendRepository>,
    users: Arc<dyn UserRepository>,
    policy: QuotaPolicy,
}

impl CreateFriendHandler {
    pub fn new(friends: Arc<dyn FriendRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            friends,
            users,
            policy: QuotaPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: QuotaPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn handle(&self, cmd: CreateFriendCommand) -> Result<Friend, ChatError> {
        // 1. Validate the profile
        let friend = Friend::create(cmd.user_id.clone(), cmd.profile, Timestamp::now())?;

        // 2. Enforce the tier's friend cap
        let user = load_user(self.users.as_ref(), &cmd.user_id).await?;
        let limits = self.policy.limits_for(user.tier);
        let current = self.friends.count_for_user(&user.id).await?;
        if limits.friend_limit_reached(current) {
            return Err(ChatError::FriendLimitReached {
                limit: limits.max_friends.unwrap_or(current),
            });
        }

        // 3. Persist
        self.friends.create(&friend).await?;
        info!(user_id = %user.id, friend_id = %friend.id, "Friend created");

        Ok(friend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::application::handlers::test_support::{owner, Fixture};
    use crate::domain::quota::SubscriptionTier;

    fn handler(fx: &Fixture) -> CreateFriendHandler {
        CreateFriendHandler::new(fx.store.clone(), fx.store.clone())
    }

    fn command(name: &str) -> CreateFriendCommand {
        CreateFriendCommand {
            user_id: owner(),
            profile: FriendProfile::new(name, "Curious, kind and a little sarcastic."),
        }
    }

    #[tokio::test]
    async fn creates_friend_for_owner() {
        let fx = Fixture::new(MockAIProvider::new()).await;

        let friend = handler(&fx).handle(command("  Max ")).await.unwrap();

        assert_eq!(friend.name, "Max");
        assert_eq!(friend.user_id, owner());
        assert!(fx.store.friend(&friend.id).await.is_some());
    }

    #[tokio::test]
    async fn free_tier_is_capped_at_five() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        let handler = handler(&fx);
        // The fixture already holds one friend.
        for i in 0..4 {
            handler.handle(command(&format!("f{}", i))).await.unwrap();
        }

        let err = handler.handle(command("one too many")).await.unwrap_err();

        assert_eq!(err, ChatError::FriendLimitReached { limit: 5 });
    }

    #[tokio::test]
    async fn premium_tier_has_a_higher_cap() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        fx.store.set_tier(&owner(), SubscriptionTier::Premium).await;
        let handler = handler(&fx);

        for i in 0..5 {
            handler.handle(command(&format!("f{}", i))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn invalid_profile_is_rejected() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        let mut cmd = command("Max");
        cmd.profile.personality = "short".to_string();

        let err = handler(&fx).handle(cmd).await.unwrap_err();

        assert!(matches!(err, ChatError::Validation(_)));
    }
}
