//! Axum router configuration for friend endpoints.

use axum::{routing::get, Router};

use super::handlers::{create_friend, delete_friend, get_friend, list_friends};
use crate::adapters::http::AppState;

/// Friend routes, relative to `/api`.
///
/// - `GET /friends` - List the caller's friends
/// - `POST /friends` - Create a friend
/// - `GET /friends/:id` - Get one friend
/// - `DELETE /friends/:id` - Delete a friend and its messages
pub fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/friends", get(list_friends).post(create_friend))
        .route("/friends/:id", get(get_friend).delete(delete_friend))
}
