//! Bearer token authentication for staff.
//!
//! Customers at the table carry no token and are served as
//! [`Actor::Anonymous`]. Staff send `Authorization: Bearer <jwt>`, or
//! `?token=<jwt>` on a WebSocket upgrade. A token that fails validation is
//! refused outright rather than treated as anonymous.
//!
//! Handlers read the outcome with [`Caller`] (anyone) or [`StaffUser`]
//! (401 without a token).

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::domain::foundation::{Actor, AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

pub type AuthState = Arc<dyn SessionValidator>;

pub const TOKEN_QUERY_PARAM: &str = "token";

pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&request) else {
        return next.run(request).await;
    };

    match validator.validate(&token).await {
        Ok(user) => {
            tracing::trace!(user_id = %user.id, role = ?user.role, "Staff token accepted");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => rejection(&err),
    }
}

fn rejection(err: &AuthError) -> Response {
    let (status, message) = match err {
        AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
        AuthError::WrongTokenType => (StatusCode::UNAUTHORIZED, "Wrong token type"),
        AuthError::ServiceUnavailable(detail) => {
            tracing::error!(error = %detail, "Token validation unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Authentication service unavailable",
            )
        }
    };
    tracing::debug!(error = %err, "Token refused");

    (status, Json(ErrorResponse::new("AUTH_ERROR", message))).into_response()
}

/// Header first; the query only on WebSocket upgrades, so tokens stay out of
/// access logs for plain requests.
pub fn extract_token<B>(request: &axum::http::Request<B>) -> Option<String> {
    let from_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    if !is_websocket_upgrade(request) {
        return None;
    }

    request
        .uri()
        .query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.to_string())
        .filter(|t| !t.is_empty())
}

fn is_websocket_upgrade<B>(request: &axum::http::Request<B>) -> bool {
    request
        .headers()
        .get(header::UPGRADE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| h.eq_ignore_ascii_case("websocket"))
}

/// Whoever is calling, staff or anonymous. Never rejects.
#[derive(Debug, Clone)]
pub struct Caller(pub Actor);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<AuthenticatedUser>().cloned();
        Ok(Caller(Actor::from(user)))
    }
}

/// A validated staff member; anonymous callers get 401.
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthenticatedUser);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for StaffUser {
    type Rejection = Unauthenticated;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(StaffUser)
            .ok_or(Unauthenticated)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Unauthenticated;

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "UNAUTHENTICATED",
                "Staff authentication required",
            )),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::domain::foundation::{Role, UserId};
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "waiter@bistro.test", Role::Waiter)
    }

    async fn whoami(Caller(actor): Caller) -> String {
        match actor {
            Actor::Staff(user) => user.email,
            Actor::Anonymous => "anonymous".to_string(),
        }
    }

    fn app(validator: MockSessionValidator) -> Router {
        let validator: AuthState = Arc::new(validator);
        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(validator, auth_middleware))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Middleware Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_token_passes_through_as_anonymous() {
        let response = app(MockSessionValidator::new())
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "anonymous");
    }

    #[tokio::test]
    async fn valid_bearer_token_injects_user() {
        let validator = MockSessionValidator::new().with_user("good", test_user());
        let response = app(validator)
            .oneshot(
                Request::get("/whoami")
                    .header("Authorization", "Bearer good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_text(response).await, "waiter@bistro.test");
    }

    #[tokio::test]
    async fn invalid_token_is_refused() {
        let response = app(MockSessionValidator::new())
            .oneshot(
                Request::get("/whoami")
                    .header("Authorization", "Bearer forged")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("AUTH_ERROR"));
    }

    #[tokio::test]
    async fn unavailable_validator_returns_503() {
        let validator = MockSessionValidator::unavailable("down");
        let response = app(validator)
            .oneshot(
                Request::get("/whoami")
                    .header("Authorization", "Bearer anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn query_token_ignored_on_plain_requests() {
        let validator = MockSessionValidator::new().with_user("good", test_user());
        let response = app(validator)
            .oneshot(
                Request::get("/whoami?token=good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_text(response).await, "anonymous");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Token Extraction Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn extract_token_reads_bearer_header() {
        let request = Request::get("/x")
            .header("Authorization", "Bearer abc.def.ghi")
            .body(())
            .unwrap();
        assert_eq!(extract_token(&request).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn extract_token_ignores_other_schemes() {
        let request = Request::get("/x")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap();
        assert_eq!(extract_token(&request), None);
    }

    #[test]
    fn extract_token_reads_query_on_websocket_upgrade() {
        let request = Request::get("/orders/1/ws?lang=de&token=abc.def")
            .header("Upgrade", "websocket")
            .body(())
            .unwrap();
        assert_eq!(extract_token(&request).as_deref(), Some("abc.def"));
    }

    #[test]
    fn extract_token_prefers_header_over_query() {
        let request = Request::get("/orders/1/ws?token=from-query")
            .header("Upgrade", "websocket")
            .header("Authorization", "Bearer from-header")
            .body(())
            .unwrap();
        assert_eq!(extract_token(&request).as_deref(), Some("from-header"));
    }

    #[test]
    fn extract_token_treats_empty_query_value_as_missing() {
        let request = Request::get("/orders/1/ws?token=")
            .header("Upgrade", "websocket")
            .body(())
            .unwrap();
        assert_eq!(extract_token(&request), None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Extractor Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn staff_user_extracts_user_from_extensions() {
        let mut request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(test_user());
        let (mut parts, _body) = request.into_parts();

        let StaffUser(user) = StaffUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.role, Role::Waiter);
    }

    #[tokio::test]
    async fn staff_user_is_refused_for_anonymous_callers() {
        let request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let rejection = StaffUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("UNAUTHENTICATED"));
    }

    #[tokio::test]
    async fn caller_is_anonymous_without_user() {
        let request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let Caller(actor) = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(actor, Actor::Anonymous);
    }

    #[test]
    fn extractors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthState>();
        assert_send_sync::<StaffUser>();
        assert_send_sync::<Caller>();
    }
}
