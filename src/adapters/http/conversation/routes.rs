//! Axum router configuration for conversation endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_messages, rollback_message, send_message, send_message_stream};
use crate::adapters::http::AppState;

/// Conversation routes, relative to `/api`.
///
/// - `GET /friends/:id/messages` - Page through history
/// - `POST /friends/:id/messages` - Send, non-streaming
/// - `POST /friends/:id/messages/stream` - Send, reply streamed as SSE
/// - `POST /messages/:id/rollback` - Roll back an assistant reply
pub fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/friends/:id/messages",
            get(get_messages).post(send_message),
        )
        .route("/friends/:id/messages/stream", post(send_message_stream))
        .route("/messages/:id/rollback", post(rollback_message))
}
