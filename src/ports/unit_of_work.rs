//! Atomic multi-row writes.
//!
//! Callers describe the writes as a list of operations and hand the whole
//! list over at once. Adapters apply every operation or none of them.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::conversation::Message;
use crate::domain::foundation::{MessageId, UserId};
use crate::domain::friend::Friend;

/// One write inside a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    CreateFriend(Friend),
    CreateMessage(Message),
    /// Fails the whole unit with `NotFound` if the message is absent.
    DeleteMessage(MessageId),
    MarkDefaultFriendsSeeded(UserId),
}

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Applies `operations` in order inside one transaction.
    async fn commit(&self, operations: Vec<StoreOperation>) -> Result<(), RepositoryError>;
}
