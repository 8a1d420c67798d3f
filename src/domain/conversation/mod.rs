//! Conversations between a user and one friend.

pub mod persona;

mod context;
mod message;
mod page;
mod relay;

pub use context::{BuiltContext, ContextBuilder, ContextMessage, DEFAULT_CONTEXT_WINDOW};
pub use message::{validate_outgoing, Message, MessageRole, MESSAGE_MAX_CHARS};
pub use page::{MessageCursor, MessagePage, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use relay::{RelayPhase, ReplyBuffer, StreamEvent};
