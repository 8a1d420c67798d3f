//! Storage ports for friends, messages, and users.
//!
//! Single-row reads and writes go through these traits. Anything that must
//! land atomically across rows goes through [`UnitOfWork`](super::UnitOfWork).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::{Message, MessagePage, PageRequest};
use crate::domain::foundation::{FriendId, MessageId, Timestamp, UserId};
use crate::domain::friend::Friend;
use crate::domain::quota::DailyQuota;
use crate::domain::user::UserAccount;

/// Errors from storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl RepositoryError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}

/// A friend together with how many messages its conversation holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendSummary {
    pub friend: Friend,
    pub message_count: u64,
}

#[async_trait]
pub trait FriendRepository: Send + Sync {
    async fn find_by_id(&self, id: &FriendId) -> Result<Option<Friend>, RepositoryError>;

    /// The user's friends, most recently active first, with message counts.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<FriendSummary>, RepositoryError>;

    async fn count_for_user(&self, user_id: &UserId) -> Result<u32, RepositoryError>;

    async fn create(&self, friend: &Friend) -> Result<(), RepositoryError>;

    /// Deletes the friend and, by cascade, all of its messages.
    ///
    /// Returns `NotFound` if the friend does not exist.
    async fn delete(&self, id: &FriendId) -> Result<(), RepositoryError>;

    /// Sets `updated_at`.
    async fn touch(&self, id: &FriendId, at: Timestamp) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError>;

    /// The newest `limit` non-system messages of a conversation, oldest first.
    async fn recent_for_friend(
        &self,
        friend_id: &FriendId,
        limit: u32,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// The latest user message created strictly before `before`.
    async fn find_preceding_user_message(
        &self,
        friend_id: &FriendId,
        before: Timestamp,
    ) -> Result<Option<Message>, RepositoryError>;

    /// One page of non-system messages, walking backward from the cursor.
    async fn page_for_friend(
        &self,
        friend_id: &FriendId,
        page: PageRequest,
    ) -> Result<MessagePage, RepositoryError>;

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError>;

    /// Inserts the account. Returns `Conflict` if it already exists.
    async fn create(&self, user: &UserAccount) -> Result<(), RepositoryError>;

    /// Writes the counter and reset time after a lazy reset.
    async fn save_quota(&self, id: &UserId, quota: DailyQuota) -> Result<(), RepositoryError>;

    /// Atomically adds one to `messages_used_today`.
    async fn increment_messages_used(&self, id: &UserId) -> Result<(), RepositoryError>;
}
