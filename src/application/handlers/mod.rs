//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations over the
//! ports. Each handler holds `Arc<dyn Port>` dependencies and exposes one
//! async `handle` method.

mod access;
pub mod conversation;
pub mod friend;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use conversation::{
    ExchangePersister, GetConversationHandler, GetConversationQuery, RollbackMessageCommand,
    RollbackMessageHandler, RollbackMessageResult, SendMessageCommand, SendMessageHandler,
    SendMessageResult,
};
pub use friend::{
    CreateFriendCommand, CreateFriendHandler, DeleteFriendCommand, DeleteFriendHandler,
    GetFriendHandler, GetFriendQuery, ListFriendsHandler, ListFriendsQuery,
};
pub use user::{EnsureUserHandler, GetStatsHandler, GetUsageHandler, SeedDefaultFriendsHandler};
