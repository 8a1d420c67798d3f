//! GetStats query handler.

use std::sync::Arc;

use crate::application::handlers::access::load_user;
use crate::application::ChatError;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::user::{MostActiveFriend, UserStats};
use crate::ports::{FriendRepository, FriendSummary, MessageRepository, UserRepository};

pub struct GetStatsHandler {
    friends: Arc<dyn FriendRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
}

impl GetStatsHandler {
    pub fn new(
        friends: Arc<dyn FriendRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            friends,
            messages,
            users,
        }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<UserStats, ChatError> {
        let user = load_user(self.users.as_ref(), user_id).await?;
        let friends = self.friends.list_for_user(user_id).await?;
        let total_messages = self.messages.count_for_user(user_id).await?;

        Ok(UserStats {
            total_friends: friends.len() as u64,
            total_messages,
            account_age_days: Timestamp::now().days_since(&user.created_at),
            most_active_friend: most_active(&friends),
        })
    }
}

/// Highest message count; ties go to the most recently active friend.
fn most_active(friends: &[FriendSummary]) -> Option<MostActiveFriend> {
    let mut best: Option<&FriendSummary> = None;
    for summary in friends {
        if best.map_or(true, |b| summary.message_count > b.message_count) {
            best = Some(summary);
        }
    }
    best.map(|s| MostActiveFriend {
        id: s.friend.id,
        name: s.friend.name.clone(),
        message_count: s.message_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::application::handlers::test_support::{owner, stranger, Fixture};
    use crate::domain::conversation::MessageRole;

    fn handler(fx: &Fixture) -> GetStatsHandler {
        GetStatsHandler::new(fx.store.clone(), fx.store.clone(), fx.store.clone())
    }

    #[tokio::test]
    async fn counts_friends_and_messages() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        fx.seed_message(MessageRole::User, "hi", 0).await;
        fx.seed_message(MessageRole::Assistant, "hello", 1).await;
        fx.seed_message(MessageRole::System, "hidden", 2).await;

        let stats = handler(&fx).handle(&owner()).await.unwrap();

        assert_eq!(stats.total_friends, 1);
        assert_eq!(stats.total_messages, 2);
        assert_eq!(stats.account_age_days, 0);
        let most_active = stats.most_active_friend.unwrap();
        assert_eq!(most_active.id, fx.friend.id);
        assert_eq!(most_active.name, "Luna");
    }

    #[tokio::test]
    async fn no_friends_means_no_most_active() {
        let fx = Fixture::new(MockAIProvider::new()).await;

        let stats = handler(&fx).handle(&stranger()).await.unwrap();

        assert_eq!(stats.total_friends, 0);
        assert!(stats.most_active_friend.is_none());
    }
}
