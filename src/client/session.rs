//! Drives sends and deletes against a transport.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tracing::{debug, warn};

use super::{ClientError, ConversationState};
use crate::domain::conversation::{Message, StreamEvent};
use crate::domain::foundation::{FriendId, MessageId, Timestamp};

/// Events of one streamed send, in emission order.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ClientError>> + Send>>;

/// Port to the chat service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Opens a streamed send. Errors here mean the stream never opened.
    async fn send(&self, friend_id: &FriendId, content: &str) -> Result<EventStream, ClientError>;

    /// Rolls back an assistant message, returning the deleted ids.
    async fn rollback(&self, message_id: &MessageId) -> Result<Vec<MessageId>, ClientError>;
}

/// What a committed send produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub assistant_message: Message,
    pub warning: Option<String>,
}

/// One conversation bound to a transport.
///
/// Failures restore the pre-send state and are returned to the caller.
/// Nothing is retried.
pub struct ChatSession<T: ChatTransport> {
    transport: T,
    state: ConversationState,
}

impl<T: ChatTransport> ChatSession<T> {
    pub fn new(transport: T, state: ConversationState) -> Self {
        Self { transport, state }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn into_state(self) -> ConversationState {
        self.state
    }

    pub async fn send(&mut self, content: &str) -> Result<SendOutcome, ClientError> {
        self.send_observed(content, |_| {}).await
    }

    /// Like `send`, calling `observe` after every state change.
    pub async fn send_observed<F>(
        &mut self,
        content: &str,
        mut observe: F,
    ) -> Result<SendOutcome, ClientError>
    where
        F: FnMut(&ConversationState),
    {
        self.state.begin_send(content, Timestamp::now())?;
        observe(&self.state);

        let friend_id = self.state.friend_id();
        let mut events = match self.transport.send(&friend_id, content).await {
            Ok(events) => events,
            Err(e) => return Err(self.abandon(e, &mut observe)),
        };

        while let Some(item) = events.next().await {
            match item {
                Ok(StreamEvent::Delta { text }) => {
                    self.state.apply_delta(&text)?;
                    observe(&self.state);
                }
                Ok(StreamEvent::Final {
                    user_message,
                    assistant_message,
                    warning,
                }) => {
                    if let Some(warning) = &warning {
                        warn!(%friend_id, warning = %warning, "Send stored with warning");
                    }
                    self.state
                        .apply_final(user_message, assistant_message.clone())?;
                    observe(&self.state);
                    return Ok(SendOutcome {
                        assistant_message,
                        warning,
                    });
                }
                Ok(StreamEvent::Error { code, message }) => {
                    let err = ClientError::Server { code, message };
                    return Err(self.abandon(err, &mut observe));
                }
                Err(e) => return Err(self.abandon(e, &mut observe)),
            }
        }

        let err = ClientError::Transport("stream ended before the final event".to_string());
        Err(self.abandon(err, &mut observe))
    }

    /// Removes a reply and its user message, restoring both if the server
    /// refuses.
    pub async fn delete(&mut self, assistant_id: MessageId) -> Result<Vec<MessageId>, ClientError> {
        let snapshot = self.state.begin_delete(assistant_id)?;

        match self.transport.rollback(&assistant_id).await {
            Ok(deleted_ids) => {
                self.state.confirm_delete(&deleted_ids);
                debug!(message_id = %assistant_id, deleted = deleted_ids.len(), "Rolled back");
                Ok(deleted_ids)
            }
            Err(e) => {
                self.state.restore(snapshot);
                Err(e)
            }
        }
    }

    fn abandon<F>(&mut self, err: ClientError, observe: &mut F) -> ClientError
    where
        F: FnMut(&ConversationState),
    {
        self.state.fail(err.to_string());
        observe(&self.state);
        err
    }
}
