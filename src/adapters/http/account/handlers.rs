//! HTTP handlers for the caller's own account.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::{ApiError, AppState};

use super::dto::SeedDefaultsResponse;

/// GET /api/me/usage - Messages used today, limit, and reset time
pub async fn get_usage(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let usage = state.get_usage_handler().handle(&user.id).await?;
    Ok(Json(usage))
}

/// GET /api/me/stats - Friend and message totals
pub async fn get_stats(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.get_stats_handler().handle(&user.id).await?;
    Ok(Json(stats))
}

/// POST /api/me/seed-defaults - Create the built-in friends once
pub async fn seed_defaults(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let friend_ids = state.seed_defaults_handler().handle(&user.id).await?;
    Ok(Json(SeedDefaultsResponse { friend_ids }))
}
