//! Bounded prompt assembly for the completion backend.
//!
//! A prompt is always `[system] + [tail of history] + [new user message]`.
//! System rows from history are dropped and only the most recent
//! `window` messages survive, in ascending creation order.

use serde::{Deserialize, Serialize};

use super::{persona, Message, MessageRole};
use crate::domain::friend::Friend;
use crate::domain::user::UserAccount;

/// Default number of historical messages kept in the prompt.
pub const DEFAULT_CONTEXT_WINDOW: usize = 30;

/// A role/content pair as sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ContextMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// The assembled prompt, kept in its three segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltContext {
    pub system: ContextMessage,
    pub history: Vec<ContextMessage>,
    pub new_message: ContextMessage,
    /// Non-system messages that fell outside the window.
    pub truncated_count: usize,
}

impl BuiltContext {
    /// Flattens the segments into the ordered list sent to the backend.
    pub fn into_messages(self) -> Vec<ContextMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(self.system);
        messages.extend(self.history);
        messages.push(self.new_message);
        messages
    }

    pub fn was_truncated(&self) -> bool {
        self.truncated_count > 0
    }
}

/// Builds prompts with a fixed history window.
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    window: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_WINDOW)
    }
}

impl ContextBuilder {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Assembles the prompt.
    ///
    /// `history` must be in ascending creation order. It may be the full
    /// conversation or any suffix at least `window` non-system messages long.
    pub fn build(
        &self,
        friend: &Friend,
        user: &UserAccount,
        history: &[Message],
        new_message: &str,
    ) -> BuiltContext {
        let eligible: Vec<&Message> = history.iter().filter(|m| !m.is_system()).collect();
        let skip = eligible.len().saturating_sub(self.window);

        let history = eligible[skip..]
            .iter()
            .map(|m| ContextMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();

        BuiltContext {
            system: ContextMessage::system(persona::system_prompt(friend, user)),
            history,
            new_message: ContextMessage::user(new_message),
            truncated_count: skip,
        }
    }
}
