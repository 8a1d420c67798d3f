//! DeleteFriend command handler.

use std::sync::Arc;
use tracing::info;

use crate::application::handlers::access::load_owned_friend;
use crate::application::ChatError;
use crate::domain::foundation::{FriendId, UserId};
use crate::ports::FriendRepository;

#[derive(Debug, Clone)]
pub struct DeleteFriendCommand {
    pub user_id: UserId,
    pub friend_id: FriendId,
}

pub struct DeleteFriendHandler {
    friends: Arc<dyn FriendRepository>,
}

impl DeleteFriendHandler {
    pub fn new(friends: Arc<dyn FriendRepository>) -> Self {
        Self { friends }
    }

    /// Deletes the friend and its whole conversation.
    pub async fn handle(&self, cmd: DeleteFriendCommand) -> Result<(), ChatError> {
        let friend = load_owned_friend(self.friends.as_ref(), &cmd.friend_id, &cmd.user_id).await?;
        self.friends.delete(&friend.id).await?;
        info!(user_id = %cmd.user_id, friend_id = %friend.id, "Friend deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::application::handlers::test_support::{owner, stranger, Fixture};
    use crate::domain::conversation::MessageRole;

    #[tokio::test]
    async fn delete_cascades_to_messages() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        fx.seed_message(MessageRole::User, "hi", 0).await;
        fx.seed_message(MessageRole::Assistant, "hello", 1).await;

        DeleteFriendHandler::new(fx.store.clone())
            .handle(DeleteFriendCommand { user_id: owner(), friend_id: fx.friend.id })
            .await
            .unwrap();

        assert!(fx.store.friend(&fx.friend.id).await.is_none());
        assert_eq!(fx.store.message_count().await, 0);
    }

    #[tokio::test]
    async fn stranger_cannot_delete() {
        let fx = Fixture::new(MockAIProvider::new()).await;

        let err = DeleteFriendHandler::new(fx.store.clone())
            .handle(DeleteFriendCommand { user_id: stranger(), friend_id: fx.friend.id })
            .await
            .unwrap_err();

        assert_eq!(err, ChatError::Unauthorized);
        assert!(fx.store.friend(&fx.friend.id).await.is_some());
    }
}
