//! Optimistic conversation state.
//!
//! Committed messages and the in-flight typing buffer are kept apart so a
//! partial reply never shows up as a message. Every change goes through one
//! of the transition methods below.
//!
//! ```text
//! Idle/Committed/RolledBack
//!   -> begin_send -> OptimisticPending
//!   -> apply_delta -> Streaming
//!   -> apply_final -> Committed
//!   -> fail        -> RolledBack
//! ```

use std::fmt;

use super::ClientError;
use crate::domain::conversation::{Message, MessageRole};
use crate::domain::foundation::{FriendId, MessageId, Timestamp};

/// Identity of a message held by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientMessageId {
    /// Assigned by the server.
    Server(MessageId),
    /// Synthetic id of an optimistic message, `local-user-<millis>`.
    Local(String),
}

impl ClientMessageId {
    fn local_user(now: Timestamp) -> Self {
        Self::Local(format!("local-user-{}", now.as_unix_millis()))
    }
}

impl fmt::Display for ClientMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessageId::Server(id) => write!(f, "{}", id),
            ClientMessageId::Local(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    pub id: ClientMessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: Timestamp,
}

impl ClientMessage {
    pub fn is_local(&self) -> bool {
        matches!(self.id, ClientMessageId::Local(_))
    }
}

impl From<Message> for ClientMessage {
    fn from(message: Message) -> Self {
        Self {
            id: ClientMessageId::Server(message.id),
            role: message.role,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

/// Where the current send stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendPhase {
    Idle,
    /// The user message is shown locally; nothing has come back yet.
    OptimisticPending { pending_id: ClientMessageId },
    /// Reply text is arriving in the typing buffer.
    Streaming { pending_id: ClientMessageId },
    /// The last send was stored by the server.
    Committed,
    /// The last send failed and its optimistic message was removed.
    RolledBack { error: String },
}

impl SendPhase {
    /// True while a send is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SendPhase::OptimisticPending { .. } | SendPhase::Streaming { .. }
        )
    }

    fn pending_id(&self) -> Option<&ClientMessageId> {
        match self {
            SendPhase::OptimisticPending { pending_id } | SendPhase::Streaming { pending_id } => {
                Some(pending_id)
            }
            _ => None,
        }
    }
}

/// Exact copy of the message list, taken before an optimistic delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot(Vec<ClientMessage>);

/// One conversation as the client sees it.
#[derive(Debug, Clone)]
pub struct ConversationState {
    friend_id: FriendId,
    messages: Vec<ClientMessage>,
    typing: String,
    phase: SendPhase,
}

impl ConversationState {
    pub fn new(friend_id: FriendId) -> Self {
        Self {
            friend_id,
            messages: Vec::new(),
            typing: String::new(),
            phase: SendPhase::Idle,
        }
    }

    /// Starts from server history. System messages are dropped.
    pub fn load(friend_id: FriendId, history: Vec<Message>) -> Self {
        let mut state = Self::new(friend_id);
        state.messages = history
            .into_iter()
            .filter(|m| !m.is_system())
            .map(ClientMessage::from)
            .collect();
        state
    }

    pub fn friend_id(&self) -> FriendId {
        self.friend_id
    }

    pub fn messages(&self) -> &[ClientMessage] {
        &self.messages
    }

    /// Reply text received so far for the in-flight send.
    pub fn typing(&self) -> &str {
        &self.typing
    }

    pub fn phase(&self) -> &SendPhase {
        &self.phase
    }

    /// New sends are refused while this is true.
    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    /// Shows the user message immediately under a synthetic id.
    pub fn begin_send(
        &mut self,
        content: &str,
        now: Timestamp,
    ) -> Result<ClientMessageId, ClientError> {
        if self.is_busy() {
            return Err(ClientError::SendInFlight);
        }
        if content.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }

        let pending_id = ClientMessageId::local_user(now);
        self.messages.push(ClientMessage {
            id: pending_id.clone(),
            role: MessageRole::User,
            content: content.to_string(),
            created_at: now,
        });
        self.typing.clear();
        self.phase = SendPhase::OptimisticPending {
            pending_id: pending_id.clone(),
        };
        Ok(pending_id)
    }

    /// Appends a reply fragment to the typing buffer.
    pub fn apply_delta(&mut self, text: &str) -> Result<(), ClientError> {
        let pending_id = self.require_pending("delta")?;
        self.typing.push_str(text);
        self.phase = SendPhase::Streaming { pending_id };
        Ok(())
    }

    /// Swaps the optimistic message for the stored pair.
    ///
    /// The typing buffer empties in the same step that appends the reply,
    /// so the two are never visible together.
    pub fn apply_final(
        &mut self,
        user_message: Message,
        assistant_message: Message,
    ) -> Result<(), ClientError> {
        let pending_id = self.require_pending("final")?;
        self.messages.retain(|m| m.id != pending_id);
        self.messages.push(user_message.into());
        self.messages.push(assistant_message.into());
        self.typing.clear();
        self.phase = SendPhase::Committed;
        Ok(())
    }

    /// Drops the optimistic message and records the error.
    pub fn fail(&mut self, error: impl Into<String>) {
        if let Some(pending_id) = self.phase.pending_id().cloned() {
            self.messages.retain(|m| m.id != pending_id);
        }
        self.typing.clear();
        self.phase = SendPhase::RolledBack {
            error: error.into(),
        };
    }

    /// Removes a reply and the user message before it, returning the list
    /// as it was.
    pub fn begin_delete(&mut self, assistant_id: MessageId) -> Result<MessageSnapshot, ClientError> {
        if self.is_busy() {
            return Err(ClientError::SendInFlight);
        }
        let target = ClientMessageId::Server(assistant_id);
        let index = self
            .messages
            .iter()
            .position(|m| m.id == target)
            .ok_or(ClientError::UnknownMessage(assistant_id))?;

        let snapshot = MessageSnapshot(self.messages.clone());
        let paired = self.messages[..index]
            .iter()
            .rposition(|m| m.role == MessageRole::User);

        self.messages.remove(index);
        if let Some(paired) = paired {
            self.messages.remove(paired);
        }
        Ok(snapshot)
    }

    /// Drops anything the server reports deleted that is still shown.
    pub fn confirm_delete(&mut self, deleted_ids: &[MessageId]) {
        self.messages.retain(|m| match &m.id {
            ClientMessageId::Server(id) => !deleted_ids.contains(id),
            ClientMessageId::Local(_) => true,
        });
    }

    /// Puts back the exact list captured by `begin_delete`.
    pub fn restore(&mut self, snapshot: MessageSnapshot) {
        self.messages = snapshot.0;
    }

    fn require_pending(&self, event: &str) -> Result<ClientMessageId, ClientError> {
        self.phase.pending_id().cloned().ok_or_else(|| {
            ClientError::Protocol(format!("{} event with no send in flight", event))
        })
    }
}
