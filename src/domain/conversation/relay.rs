//! Lifecycle of one streamed completion.

use serde::{Deserialize, Serialize};

use super::Message;
use crate::domain::foundation::StateMachine;

/// Event delivered to the caller of a streamed send.
///
/// Zero or more `Delta` events arrive in emission order, followed by exactly
/// one `Final` on success or one `Error` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A non-empty fragment of the growing reply.
    Delta { text: String },
    /// The exchange has been persisted.
    Final {
        user_message: Message,
        assistant_message: Message,
        /// Set when the quota or activity follow-up failed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    /// The send failed after the stream opened. Nothing was persisted.
    Error { code: String, message: String },
}

impl StreamEvent {
    pub fn delta(text: impl Into<String>) -> Self {
        Self::Delta { text: text.into() }
    }

    /// True for `Final` and `Error`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Delta { .. })
    }
}

/// Phase of a completion relay.
///
/// ```text
/// Opening -> Streaming -> Finalizing -> Persisted
///    |           |            |
///    +-----------+------------+-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayPhase {
    /// Request dispatched, nothing received yet.
    Opening,
    /// At least one delta has been forwarded.
    Streaming,
    /// The reply is complete and will be persisted.
    Finalizing,
    /// The exchange is durably recorded.
    Persisted,
    /// Nothing was persisted.
    Failed,
}

impl StateMachine for RelayPhase {
    fn successors(&self) -> &'static [Self] {
        use RelayPhase::*;
        match self {
            Opening => &[Streaming, Failed],
            Streaming => &[Finalizing, Failed],
            Finalizing => &[Persisted, Failed],
            Persisted | Failed => &[],
        }
    }
}

/// Accumulates delta fragments in emission order.
#[derive(Debug, Default, Clone)]
pub struct ReplyBuffer {
    text: String,
    fragments: usize,
}

impl ReplyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment. Empty fragments are ignored and return false.
    pub fn push(&mut self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.text.push_str(fragment);
        self.fragments += 1;
        true
    }

    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// The trimmed reply, or `None` when nothing but whitespace arrived.
    pub fn finish(self) -> Option<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
