//! Authentication middleware and extractor for axum.
//!
//! - `auth_middleware` validates the Bearer token, provisions the account on
//!   first sight, and injects the caller into request extensions
//! - `RequireAuth` reads the caller back out in route handlers
//!
//! ```text
//! Request → auth_middleware → SessionValidator → EnsureUserHandler
//!                ↓
//!         extensions: AuthenticatedUser → RequireAuth
//! ```

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::{ApiError, AppState, ErrorResponse};
use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates Bearer tokens on every request it wraps.
///
/// 1. Extracts the token from the `Authorization` header
/// 2. Validates it with the `SessionValidator` port
/// 3. Makes sure the account row exists
/// 4. Injects `AuthenticatedUser` into request extensions
///
/// Requests without a token pass through untouched and are rejected by
/// `RequireAuth`. Invalid tokens get 401 here.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return next.run(request).await;
    };

    let user = match state.session_validator.validate(token).await {
        Ok(user) => user,
        Err(e) => return auth_error_response(&e),
    };

    if let Err(e) = state.ensure_user_handler().handle(&user).await {
        return ApiError(e).into_response();
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}

fn auth_error_response(err: &AuthError) -> Response {
    let (status, message) = match err {
        AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
        AuthError::ServiceUnavailable(msg) => {
            tracing::error!("Auth service unavailable: {}", msg);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Authentication service unavailable",
            )
        }
    };

    (status, Json(ErrorResponse::new("AUTH_ERROR", message))).into_response()
}

/// Extractor that requires an authenticated caller.
///
/// ```ignore
/// async fn my_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "UNAUTHENTICATED",
                    "Authentication required",
                )),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    use crate::domain::foundation::UserId;

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser::new(
            UserId::new("user-123").unwrap(),
            Some("test@example.com".to_string()),
            Some("Test User".to_string()),
        )
    }

    #[tokio::test]
    async fn require_auth_extracts_user_from_extensions() {
        let mut request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(test_user());
        let (mut parts, _body) = request.into_parts();

        let RequireAuth(user) = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(user.id.as_str(), "user-123");
    }

    #[tokio::test]
    async fn require_auth_fails_without_user() {
        let request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[test]
    fn auth_rejection_returns_401() {
        let response = AuthRejection::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn expired_and_invalid_tokens_are_401() {
        assert_eq!(
            auth_error_response(&AuthError::TokenExpired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            auth_error_response(&AuthError::InvalidToken).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn unavailable_validator_is_503() {
        let response = auth_error_response(&AuthError::service_unavailable("jwks down"));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn require_auth_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RequireAuth>();
    }
}
