//! Axum router configuration for account endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_stats, get_usage, seed_defaults};
use crate::adapters::http::AppState;

/// Account routes, relative to `/api`.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me/usage", get(get_usage))
        .route("/me/stats", get(get_stats))
        .route("/me/seed-defaults", post(seed_defaults))
}
