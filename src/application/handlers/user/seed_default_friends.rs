//! Seeds the built-in personas into a new account.

use std::sync::Arc;
use tracing::{debug, info};

use crate::application::handlers::access::load_user;
use crate::application::ChatError;
use crate::domain::conversation::Message;
use crate::domain::foundation::{FriendId, Timestamp, UserId};
use crate::domain::friend::{Friend, DEFAULT_FRIENDS};
use crate::ports::{RepositoryError, StoreOperation, UnitOfWork, UserRepository};

pub struct SeedDefaultFriendsHandler {
    users: Arc<dyn UserRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl SeedDefaultFriendsHandler {
    pub fn new(users: Arc<dyn UserRepository>, unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            users,
            unit_of_work,
        }
    }

    /// Creates every default friend with its intro message, once per account.
    ///
    /// Returns the new friend ids, or an empty list if the account was
    /// already seeded. The friends, their intros, and the seeded flag are
    /// written in one unit of work. Setting the flag is conditional, so of
    /// two concurrent calls only one commits.
    pub async fn handle(&self, user_id: &UserId) -> Result<Vec<FriendId>, ChatError> {
        let user = load_user(self.users.as_ref(), user_id).await?;
        if user.default_friends_seeded {
            return Ok(Vec::new());
        }

        let now = Timestamp::now();
        let mut operations = Vec::with_capacity(DEFAULT_FRIENDS.len() * 2 + 1);
        operations.push(StoreOperation::MarkDefaultFriendsSeeded(user.id.clone()));
        let mut created = Vec::with_capacity(DEFAULT_FRIENDS.len());

        for (i, template) in DEFAULT_FRIENDS.iter().enumerate() {
            // Later templates sort first in the friend list.
            let created_at = now.plus_micros(2 * i as i64);
            let friend = Friend::create(user.id.clone(), template.to_profile(), created_at)?;
            let intro = Message::assistant(
                friend.id,
                user.id.clone(),
                template.intro_message,
                created_at.plus_micros(1),
            );
            created.push(friend.id);
            operations.push(StoreOperation::CreateFriend(friend));
            operations.push(StoreOperation::CreateMessage(intro));
        }

        match self.unit_of_work.commit(operations).await {
            Ok(()) => {}
            Err(RepositoryError::Conflict(reason)) => {
                debug!(user_id = %user.id, %reason, "Default friends seeded concurrently");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        }
        info!(user_id = %user.id, count = created.len(), "Seeded default friends");

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::memory::FailurePoint;
    use crate::application::handlers::test_support::{stranger, Fixture};
    use crate::domain::conversation::MessageRole;

    fn handler(fx: &Fixture) -> SeedDefaultFriendsHandler {
        SeedDefaultFriendsHandler::new(fx.store.clone(), fx.store.clone())
    }

    #[tokio::test]
    async fn seeds_every_template_with_intro() {
        let fx = Fixture::new(MockAIProvider::new()).await;

        let ids = handler(&fx).handle(&stranger()).await.unwrap();

        assert_eq!(ids.len(), DEFAULT_FRIENDS.len());
        for (id, template) in ids.iter().zip(DEFAULT_FRIENDS) {
            let friend = fx.store.friend(id).await.unwrap();
            assert_eq!(friend.name, template.name);
            let messages = fx.store.all_messages(id).await;
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].role, MessageRole::Assistant);
            assert_eq!(messages[0].content, template.intro_message);
        }
        assert!(fx.store.user(&stranger()).await.unwrap().default_friends_seeded);
    }

    #[tokio::test]
    async fn second_call_is_a_no_op() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        handler(&fx).handle(&stranger()).await.unwrap();
        let count = fx.store.message_count().await;

        let ids = handler(&fx).handle(&stranger()).await.unwrap();

        assert!(ids.is_empty());
        assert_eq!(fx.store.message_count().await, count);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_calls_seed_once() {
        for _ in 0..20 {
            let fx = Fixture::new(MockAIProvider::new()).await;
            let first = handler(&fx);
            let second = handler(&fx);

            let (a, b) = tokio::join!(
                tokio::spawn(async move { first.handle(&stranger()).await }),
                tokio::spawn(async move { second.handle(&stranger()).await }),
            );
            let (a, b) = (a.unwrap().unwrap(), b.unwrap().unwrap());

            assert_eq!(a.len() + b.len(), DEFAULT_FRIENDS.len());
            assert_eq!(fx.store.message_count().await, DEFAULT_FRIENDS.len());
        }
    }

    #[tokio::test]
    async fn marking_a_seeded_account_conflicts() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        handler(&fx).handle(&stranger()).await.unwrap();

        let result = fx
            .store
            .commit(vec![StoreOperation::MarkDefaultFriendsSeeded(stranger())])
            .await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(fx.store.message_count().await, DEFAULT_FRIENDS.len());
    }

    #[tokio::test]
    async fn failed_commit_seeds_nothing() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        fx.store.fail_on(FailurePoint::Commit).await;

        let err = handler(&fx).handle(&stranger()).await.unwrap_err();

        assert!(matches!(err, ChatError::Storage(_)));
        assert_eq!(fx.store.message_count().await, 0);
        assert!(!fx.store.user(&stranger()).await.unwrap().default_friends_seeded);
    }
}
