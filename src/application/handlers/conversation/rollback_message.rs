//! RollbackMessage command handler.
//!
//! Removes an assistant reply together with the user message that prompted
//! it, in one unit of work.

use std::sync::Arc;
use tracing::info;

use crate::application::handlers::access::load_owned_friend;
use crate::application::ChatError;
use crate::domain::conversation::MessageRole;
use crate::domain::foundation::{MessageId, UserId};
use crate::ports::{FriendRepository, MessageRepository, StoreOperation, UnitOfWork};

#[derive(Debug, Clone)]
pub struct RollbackMessageCommand {
    pub user_id: UserId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackMessageResult {
    /// The assistant message first, then its user message when one existed.
    pub deleted_ids: Vec<MessageId>,
}

pub struct RollbackMessageHandler {
    friends: Arc<dyn FriendRepository>,
    messages: Arc<dyn MessageRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl RollbackMessageHandler {
    pub fn new(
        friends: Arc<dyn FriendRepository>,
        messages: Arc<dyn MessageRepository>,
        unit_of_work: Arc<dyn UnitOfWork>,
    ) -> Self {
        Self {
            friends,
            messages,
            unit_of_work,
        }
    }

    pub async fn handle(
        &self,
        cmd: RollbackMessageCommand,
    ) -> Result<RollbackMessageResult, ChatError> {
        // 1. The target must exist
        let message = self
            .messages
            .find_by_id(&cmd.message_id)
            .await?
            .ok_or_else(|| ChatError::message_not_found(&cmd.message_id))?;

        // 2. Ownership goes through the friend
        load_owned_friend(self.friends.as_ref(), &message.friend_id, &cmd.user_id).await?;

        // 3. Only replies can be rolled back
        if message.role != MessageRole::Assistant {
            return Err(ChatError::InvalidRole);
        }

        // 4. Nearest earlier user message, if any
        let paired = self
            .messages
            .find_preceding_user_message(&message.friend_id, message.created_at)
            .await?;

        let mut deleted_ids = vec![message.id];
        deleted_ids.extend(paired.map(|m| m.id));

        // 5. Both rows go together or not at all
        let operations = deleted_ids
            .iter()
            .copied()
            .map(StoreOperation::DeleteMessage)
            .collect();
        self.unit_of_work.commit(operations).await?;

        info!(
            message_id = %message.id,
            friend_id = %message.friend_id,
            deleted = deleted_ids.len(),
            "Rolled back exchange"
        );

        Ok(RollbackMessageResult { deleted_ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::memory::FailurePoint;
    use crate::application::handlers::test_support::{owner, stranger, Fixture};
    use crate::domain::foundation::ErrorCode;

    fn handler(fx: &Fixture) -> RollbackMessageHandler {
        RollbackMessageHandler::new(fx.store.clone(), fx.store.clone(), fx.store.clone())
    }

    fn command(user_id: UserId, message_id: MessageId) -> RollbackMessageCommand {
        RollbackMessageCommand {
            user_id,
            message_id,
        }
    }

    #[tokio::test]
    async fn deletes_reply_and_its_user_message() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        let earlier = fx.seed_message(MessageRole::User, "first", 0).await;
        fx.seed_message(MessageRole::Assistant, "reply one", 1).await;
        let user = fx.seed_message(MessageRole::User, "second", 2).await;
        let reply = fx.seed_message(MessageRole::Assistant, "reply two", 3).await;

        let result = handler(&fx).handle(command(owner(), reply.id)).await.unwrap();

        assert_eq!(result.deleted_ids, vec![reply.id, user.id]);
        let remaining = fx.store.all_messages(&fx.friend.id).await;
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0], earlier);
    }

    #[tokio::test]
    async fn opening_reply_without_user_message_deletes_one() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        let intro = fx.seed_message(MessageRole::Assistant, "Hi, I'm Luna", 0).await;

        let result = handler(&fx).handle(command(owner(), intro.id)).await.unwrap();

        assert_eq!(result.deleted_ids, vec![intro.id]);
        assert_eq!(fx.store.message_count().await, 0);
    }

    #[tokio::test]
    async fn user_message_target_is_invalid_role() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        let user = fx.seed_message(MessageRole::User, "hello", 0).await;

        let err = handler(&fx).handle(command(owner(), user.id)).await.unwrap_err();

        assert_eq!(err, ChatError::InvalidRole);
        assert_eq!(fx.store.message_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_message_is_not_found() {
        let fx = Fixture::new(MockAIProvider::new()).await;

        let err = handler(&fx)
            .handle(command(owner(), MessageId::new()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::MessageNotFound);
    }

    #[tokio::test]
    async fn other_users_message_is_unauthorized() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        let reply = fx.seed_message(MessageRole::Assistant, "reply", 0).await;

        let err = handler(&fx).handle(command(stranger(), reply.id)).await.unwrap_err();

        assert_eq!(err, ChatError::Unauthorized);
        assert_eq!(fx.store.message_count().await, 1);
    }

    #[tokio::test]
    async fn failed_commit_removes_neither_message() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        fx.seed_message(MessageRole::User, "hello", 0).await;
        let reply = fx.seed_message(MessageRole::Assistant, "reply", 1).await;
        fx.store.fail_on(FailurePoint::Commit).await;

        let err = handler(&fx).handle(command(owner(), reply.id)).await.unwrap_err();

        assert!(matches!(err, ChatError::Storage(_)));
        assert_eq!(fx.store.message_count().await, 2);
    }
}
