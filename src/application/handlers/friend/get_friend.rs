//! GetFriend query handler.

use std::sync::Arc;

use crate::application::handlers::access::load_owned_friend;
use crate::application::ChatError;
use crate::domain::foundation::{FriendId, UserId};
use crate::domain::friend::Friend;
use crate::ports::FriendRepository;

#[derive(Debug, Clone)]
pub struct GetFriendQuery {
    pub user_id: UserId,
    pub friend_id: FriendId,
}

pub struct GetFriendHandler {
    friends: Arc<dyn FriendRepository>,
}

impl GetFriendHandler {
    pub fn new(friends: Arc<dyn FriendRepository>) -> Self {
        Self { friends }
    }

    pub async fn handle(&self, query: GetFriendQuery) -> Result<Friend, ChatError> {
        load_owned_friend(self.friends.as_ref(), &query.friend_id, &query.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::application::handlers::test_support::{owner, stranger, Fixture};
    use crate::domain::foundation::ErrorCode;

    #[tokio::test]
    async fn owner_can_read() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        let handler = GetFriendHandler::new(fx.store.clone());

        let friend = handler
            .handle(GetFriendQuery { user_id: owner(), friend_id: fx.friend.id })
            .await
            .unwrap();

        assert_eq!(friend, fx.friend);
    }

    #[tokio::test]
    async fn stranger_is_unauthorized_and_missing_is_not_found() {
        let fx = Fixture::new(MockAIProvider::new()).await;
        let handler = GetFriendHandler::new(fx.store.clone());

        let err = handler
            .handle(GetFriendQuery { user_id: stranger(), friend_id: fx.friend.id })
            .await
            .unwrap_err();
        assert_eq!(err, ChatError::Unauthorized);

        let err = handler
            .handle(GetFriendQuery { user_id: owner(), friend_id: FriendId::new() })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FriendNotFound);
    }
}
