//! HTTP handlers for friend endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::{ApiError, AppState};
use crate::application::handlers::{
    CreateFriendCommand, DeleteFriendCommand, GetFriendQuery, ListFriendsQuery,
};
use crate::domain::foundation::FriendId;

use super::dto::{CreateFriendRequest, FriendListResponse, FriendResponse};

/// GET /api/friends
pub async fn list_friends(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = state
        .list_friends_handler()
        .handle(ListFriendsQuery { user_id: user.id })
        .await?;

    Ok(Json(FriendListResponse {
        friends: summaries.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/friends
pub async fn create_friend(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateFriendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let friend = state
        .create_friend_handler()
        .handle(CreateFriendCommand {
            user_id: user.id,
            profile: request.profile,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(FriendResponse::from(friend))))
}

/// GET /api/friends/:id
pub async fn get_friend(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(friend_id): Path<FriendId>,
) -> Result<impl IntoResponse, ApiError> {
    let friend = state
        .get_friend_handler()
        .handle(GetFriendQuery {
            user_id: user.id,
            friend_id,
        })
        .await?;

    Ok(Json(FriendResponse::from(friend)))
}

/// DELETE /api/friends/:id
pub async fn delete_friend(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(friend_id): Path<FriendId>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .delete_friend_handler()
        .handle(DeleteFriendCommand {
            user_id: user.id,
            friend_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
