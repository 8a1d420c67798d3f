//! Persisted chat messages.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{
    FriendId, MessageId, OwnedByUser, Timestamp, UserId, ValidationError,
};

/// Longest message a user may send, in characters.
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// Checks an outgoing user message and returns it unchanged.
///
/// Blank input is rejected; the text itself is stored as typed.
pub fn validate_outgoing(content: &str) -> Result<&str, ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::empty_field("content"));
    }
    let len = content.chars().count();
    if len > MESSAGE_MAX_CHARS {
        return Err(ValidationError::too_long("content", MESSAGE_MAX_CHARS, len));
    }
    Ok(content)
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Historical instruction rows. Never sent to the backend or rendered.
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// An immutable message in a friend's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub friend_id: FriendId,
    pub user_id: UserId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: Timestamp,
}

impl Message {
    pub fn new(
        friend_id: FriendId,
        user_id: UserId,
        role: MessageRole,
        content: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::new(),
            friend_id,
            user_id,
            role,
            content: content.into(),
            created_at,
        }
    }

    /// A message written by the user.
    pub fn user(
        friend_id: FriendId,
        user_id: UserId,
        content: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self::new(friend_id, user_id, MessageRole::User, content, created_at)
    }

    /// A reply produced by the persona.
    pub fn assistant(
        friend_id: FriendId,
        user_id: UserId,
        content: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self::new(friend_id, user_id, MessageRole::Assistant, content, created_at)
    }

    pub fn is_system(&self) -> bool {
        self.role == MessageRole::System
    }
}

impl OwnedByUser for Message {
    fn owner_id(&self) -> &UserId {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outgoing_message_must_have_text() {
        assert!(validate_outgoing("   ").is_err());
        assert_eq!(validate_outgoing(" hi ").unwrap(), " hi ");
    }

    #[test]
    fn outgoing_message_is_capped() {
        let long = "a".repeat(MESSAGE_MAX_CHARS + 1);
        assert!(matches!(
            validate_outgoing(&long),
            Err(ValidationError::TooLong { .. })
        ));
        assert!(validate_outgoing(&long[1..]).is_ok());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn role_parses_storage_values() {
        for role in [MessageRole::System, MessageRole::User, MessageRole::Assistant] {
            assert_eq!(role.as_str().parse::<MessageRole>().unwrap(), role);
        }
        assert!("tool".parse::<MessageRole>().is_err());
    }

    #[test]
    fn constructors_set_role() {
        let friend = FriendId::new();
        let user = UserId::new("u").unwrap();
        let now = Timestamp::now();

        assert_eq!(Message::user(friend, user.clone(), "hi", now).role, MessageRole::User);
        let reply = Message::assistant(friend, user, "hey", now);
        assert_eq!(reply.role, MessageRole::Assistant);
        assert!(!reply.is_system());
    }
}
