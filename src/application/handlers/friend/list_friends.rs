//! ListFriends query handler.

use std::sync::Arc;

use crate::application::ChatError;
use crate::domain::foundation::UserId;
use crate::ports::{FriendRepository, FriendSummary};

#[derive(Debug, Clone)]
pub struct ListFriendsQuery {
    pub user_id: UserId,
}

pub struct ListFriendsHandler {
    friends: Arc<dyn FriendRepository>,
}

impl ListFriendsHandler {
    pub fn new(friends: Arc<dyn FriendRepository>) -> Self {
        Self { friends }
    }

    /// Most recently active first.
    pub async fn handle(&self, query: ListFriendsQuery) -> Result<Vec<FriendSummary>, ChatError> {
        Ok(self.friends.list_for_user(&query.user_id).await?)
    }
}
