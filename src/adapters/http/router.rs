//! Application router: routes, auth and tower-http layers.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::adapters::websocket::websocket_routes;

use super::middleware::{auth_middleware, AuthState};
use super::orders::order_routes;
use super::payments::payment_routes;
use super::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Transport settings for the router.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    /// Allowed browser origins; empty or `*` allows any.
    pub cors_origins: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Clone)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Routes mounted under `/api/v1`, without state or layers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(order_routes())
        .merge(payment_routes())
        .merge(websocket_routes())
}

/// Builds the complete application.
///
/// Auth runs on every `/api/v1` route; `/health` stays outside it.
pub fn build_app(state: AppState, validator: AuthState, settings: &HttpSettings) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let api = api_routes()
        .layer(axum::middleware::from_fn_with_state(validator, auth_middleware))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(cors_layer(&settings.cors_origins))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
