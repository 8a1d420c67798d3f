//! GetConversation query handler.

use std::sync::Arc;

use crate::application::handlers::access::load_owned_friend;
use crate::application::ChatError;
use crate::domain::conversation::{MessageCursor, MessagePage, PageRequest};
use crate::domain::foundation::{FriendId, UserId};
use crate::ports::{FriendRepository, MessageRepository};

/// Query for one page of a friend's conversation.
#[derive(Debug, Clone)]
pub struct GetConversationQuery {
    pub user_id: UserId,
    pub friend_id: FriendId,
    /// Oldest message already seen. `None` starts from the newest.
    pub cursor: Option<MessageCursor>,
    /// Clamped into `1..=100`, default 50.
    pub limit: Option<u32>,
}

pub struct GetConversationHandler {
    friends: Arc<dyn FriendRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl GetConversationHandler {
    pub fn new(friends: Arc<dyn FriendRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { friends, messages }
    }

    pub async fn handle(&self, query: GetConversationQuery) -> Result<MessagePage, ChatError> {
        let friend =
            load_owned_friend(self.friends.as_ref(), &query.friend_id, &query.user_id).await?;

        let page = PageRequest::new(query.cursor, query.limit);
        Ok(self.messages.page_for_friend(&friend.id, page).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::application::handlers::test_support::{owner, stranger, Fixture};
    use crate::domain::conversation::MessageRole;

    fn handler(fx: &Fixture) -> GetConversationHandler {
        GetConversationHandler::new(fx.store.clone(), fx.store.clone())
    }

    fn query(fx: &Fixture, cursor: Option<MessageCursor>, limit: Option<u32>) -> GetConversationQuery {
        GetConversationQuery {
            user_id: owner(),
            friend_id: fx.friend.id,
            cursor,
            limit,
        }
    }

    #[tokio::test]
    async fn pages_walk_backward_in_ascending_order() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        for i in 0..5 {
            fx.seed_message(MessageRole::User, &format!("m{}", i), i).await;
        }

        let first = handler(&fx).handle(query(&fx, None, Some(2))).await.unwrap();
        let contents: Vec<_> = first.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m3", "m4"]);

        let second = handler(&fx)
            .handle(query(&fx, first.next_cursor, Some(2)))
            .await
            .unwrap();
        let contents: Vec<_> = second.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m1", "m2"]);

        let third = handler(&fx)
            .handle(query(&fx, second.next_cursor, Some(2)))
            .await
            .unwrap();
        assert_eq!(third.messages.len(), 1);
        assert!(third.next_cursor.is_none());
    }

    #[tokio::test]
    async fn system_messages_are_not_returned() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        fx.seed_message(MessageRole::System, "hidden", 0).await;
        fx.seed_message(MessageRole::Assistant, "hello", 1).await;

        let page = handler(&fx).handle(query(&fx, None, None)).await.unwrap();

        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].content, "hello");
    }

    #[tokio::test]
    async fn stranger_cannot_read() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        let mut q = query(&fx, None, None);
        q.user_id = stranger();

        let err = handler(&fx).handle(q).await.unwrap_err();

        assert_eq!(err, ChatError::Unauthorized);
    }
}
