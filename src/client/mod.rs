//! Client-side conversation library.
//!
//! `ConversationState` is the optimistic state machine for one
//! conversation. `ChatSession` drives it against a `ChatTransport`, either
//! `HttpChatTransport` or `MockChatTransport` in tests.

mod http_transport;
mod mock;
mod session;
mod state;

use thiserror::Error;

pub use http_transport::HttpChatTransport;
pub use mock::MockChatTransport;
pub use session::{ChatSession, ChatTransport, EventStream, SendOutcome};
pub use state::{ClientMessage, ClientMessageId, ConversationState, MessageSnapshot, SendPhase};

use crate::domain::foundation::MessageId;

/// Client-side failures. Every one of them is safe to retry by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("A message is already being sent")]
    SendInFlight,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message {0} is not in this conversation")]
    UnknownMessage(MessageId),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("[{code}] {message}")]
    Server { code: String, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),
}
