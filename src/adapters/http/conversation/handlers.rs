//! HTTP handlers for conversation endpoints.

use std::convert::Infallible;

use axum::extract::{Json, Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::{ApiError, AppState};
use crate::application::handlers::{
    GetConversationQuery, RollbackMessageCommand, SendMessageCommand,
};
use crate::application::ChatError;
use crate::domain::conversation::StreamEvent;
use crate::domain::foundation::{FriendId, MessageId};

use super::dto::{
    event_name, ConversationParams, RollbackResponse, SendMessageRequest, SendMessageResponse,
};

/// GET /api/friends/:id/messages - One page of history, oldest first
pub async fn get_messages(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(friend_id): Path<FriendId>,
    Query(params): Query<ConversationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let cursor = params.parsed_cursor().map_err(ChatError::from)?;
    let page = state
        .get_conversation_handler()
        .handle(GetConversationQuery {
            user_id: user.id,
            friend_id,
            cursor,
            limit: params.limit,
        })
        .await?;

    Ok(Json(page))
}

/// POST /api/friends/:id/messages - Send and wait for the whole reply
pub async fn send_message(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(friend_id): Path<FriendId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .send_message_handler()
        .handle(SendMessageCommand::new(user.id, friend_id, request.content))
        .await?;

    Ok(Json(SendMessageResponse::from(result)))
}

/// POST /api/friends/:id/messages/stream - Send and stream the reply as SSE
///
/// Failures before the backend stream opens are ordinary error responses.
/// After that, failures arrive as an `error` event that ends the stream.
pub async fn send_message_stream(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(friend_id): Path<FriendId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let receiver = state
        .send_message_handler()
        .handle_stream(SendMessageCommand::new(user.id, friend_id, request.content))
        .await?;

    let events = ReceiverStream::new(receiver).map(|event| Ok(to_sse_event(&event)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// POST /api/messages/:id/rollback - Delete a reply and its user message
pub async fn rollback_message(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(message_id): Path<MessageId>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .rollback_message_handler()
        .handle(RollbackMessageCommand {
            user_id: user.id,
            message_id,
        })
        .await?;

    Ok(Json(RollbackResponse::from(result)))
}

fn to_sse_event(event: &StreamEvent) -> Event {
    let named = Event::default().event(event_name(event));
    match serde_json::to_string(event) {
        Ok(json) => named.data(json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode stream event");
            Event::default()
                .event("error")
                .data(r#"{"type":"error","code":"INTERNAL_ERROR","message":"encoding failed"}"#)
        }
    }
}
