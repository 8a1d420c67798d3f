//! HTTP DTOs for conversation endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{RollbackMessageResult, SendMessageResult};
use crate::domain::conversation::{Message, MessageCursor, StreamEvent};
use crate::domain::foundation::{MessageId, ValidationError};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of both send endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Query string of `GET /api/friends/:id/messages`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationParams {
    /// Opaque token from a previous page's `next_cursor`.
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

impl ConversationParams {
    pub fn parsed_cursor(&self) -> Result<Option<MessageCursor>, ValidationError> {
        self.cursor
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(str::parse)
            .transpose()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of the non-streaming send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub user_message: Message,
    pub assistant_message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<SendMessageResult> for SendMessageResponse {
    fn from(result: SendMessageResult) -> Self {
        Self {
            user_message: result.user_message,
            assistant_message: result.assistant_message,
            warning: result.warning,
        }
    }
}

/// Body of `POST /api/messages/:id/rollback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackResponse {
    pub deleted_ids: Vec<MessageId>,
}

impl From<RollbackMessageResult> for RollbackResponse {
    fn from(result: RollbackMessageResult) -> Self {
        Self {
            deleted_ids: result.deleted_ids,
        }
    }
}

/// SSE event name for a stream event.
pub fn event_name(event: &StreamEvent) -> &'static str {
    match event {
        StreamEvent::Delta { .. } => "delta",
        StreamEvent::Final { .. } => "final",
        StreamEvent::Error { .. } => "error",
    }
}
