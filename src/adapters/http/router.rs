//! Top-level router: health check plus the authenticated `/api` tree.

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::account::account_routes;
use super::conversation::conversation_routes;
use super::friend::friend_routes;
use super::middleware::auth_middleware;
use super::AppState;

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Time allowed until response headers are sent. Streamed bodies are
    /// not cut off.
    pub request_timeout: Duration,
    /// Allowed browser origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
        }
    }
}

/// Builds the application router.
///
/// ```text
/// GET  /health
/// /api/friends...      friend_routes
/// /api/friends/:id/messages..., /api/messages/:id/rollback
/// /api/me/...          account_routes
/// ```
pub fn app_router(state: AppState, options: &RouterOptions) -> Router {
    let api = Router::new()
        .merge(friend_routes())
        .merge(conversation_routes())
        .merge(account_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(TimeoutLayer::new(options.request_timeout))
        .layer(cors_layer(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::memory::InMemoryStore;

    fn state() -> AppState {
        let store = Arc::new(InMemoryStore::new());
        AppState::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            Arc::new(MockAIProvider::new()),
            Arc::new(MockSessionValidator::new().with_test_user("token-1", "user-1")),
        )
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = app_router(state(), &RouterOptions::default());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_rejects_missing_token() {
        let app = app_router(state(), &RouterOptions::default());

        let response = app
            .oneshot(Request::get("/api/friends").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn api_rejects_unknown_token() {
        let app = app_router(state(), &RouterOptions::default());

        let response = app
            .oneshot(
                Request::get("/api/friends")
                    .header("Authorization", "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn first_request_provisions_account() {
        let app = app_router(state(), &RouterOptions::default());

        let response = app
            .oneshot(
                Request::get("/api/me/usage")
                    .header("Authorization", "Bearer token-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn bad_cors_origins_are_skipped() {
        let _ = cors_layer(&["http://localhost:5173".to_string(), "\n".to_string()]);
    }
}
