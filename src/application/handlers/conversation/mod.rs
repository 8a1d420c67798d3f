//! Conversation command and query handlers.
//!
//! Sending messages (streamed or not), rolling back an exchange, and
//! paging through history.

mod get_conversation;
mod rollback_message;
mod send_message;

pub use get_conversation::{GetConversationHandler, GetConversationQuery};
pub use rollback_message::{
    RollbackMessageCommand, RollbackMessageHandler, RollbackMessageResult,
};
pub use send_message::{
    ExchangePersister, SendMessageCommand, SendMessageHandler, SendMessageResult,
};
