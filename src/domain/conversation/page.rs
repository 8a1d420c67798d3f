//! Keyset pagination over a conversation.
//!
//! Pages walk backward from the newest message. The cursor names the oldest
//! message already seen; the next page holds messages strictly older than it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Message;
use crate::domain::foundation::{MessageId, Timestamp, ValidationError};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Position in a conversation, ordered by `(created_at, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCursor {
    pub created_at: Timestamp,
    pub id: MessageId,
}

impl MessageCursor {
    pub fn of(message: &Message) -> Self {
        Self {
            created_at: message.created_at,
            id: message.id,
        }
    }

    /// True when `message` sorts strictly before this cursor.
    pub fn is_after(&self, message: &Message) -> bool {
        (message.created_at.as_unix_micros(), message.id)
            < (self.created_at.as_unix_micros(), self.id)
    }
}

impl fmt::Display for MessageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.created_at.as_unix_micros(), self.id)
    }
}

impl FromStr for MessageCursor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::invalid_format("cursor", "malformed cursor token");
        let (micros, id) = s.split_once('_').ok_or_else(invalid)?;
        let micros: i64 = micros.parse().map_err(|_| invalid())?;
        let created_at = Timestamp::from_unix_micros(micros).ok_or_else(invalid)?;
        let id: MessageId = id.parse().map_err(|_| invalid())?;
        Ok(Self { created_at, id })
    }
}

impl Serialize for MessageCursor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageCursor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A page request with the size already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub before: Option<MessageCursor>,
    pub limit: u32,
}

impl PageRequest {
    /// Clamps `limit` into `1..=MAX_PAGE_SIZE`, defaulting when absent.
    pub fn new(before: Option<MessageCursor>, limit: Option<u32>) -> Self {
        Self {
            before,
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of a conversation, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Present when older messages remain.
    pub next_cursor: Option<MessageCursor>,
}

impl MessagePage {
    /// Builds a page from up to `limit + 1` rows fetched newest first.
    ///
    /// The extra row only signals that another page exists.
    pub fn from_newest_first(mut rows: Vec<Message>, limit: u32) -> Self {
        let limit = limit as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(MessageCursor::of)
        } else {
            None
        };
        rows.reverse();
        Self {
            messages: rows,
            next_cursor,
        }
    }
}
