//! HTTP handlers for checkout and provider webhooks.

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::orders::dto::OrderView;
use crate::adapters::http::state::AppState;
use crate::adapters::websocket::MessageType;
use crate::application::handlers::payment::{CreateCheckoutCommand, HandlePaymentWebhookCommand};
use crate::domain::foundation::OrderId;
use crate::domain::order::OrderError;
use crate::domain::payment::CheckoutUrls;

use super::dto::{CheckoutResponse, CreateCheckoutRequest, WebhookResponse};

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// POST /orders/:order_id/payments - Open a hosted checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let urls = CheckoutUrls::new(request.success_url, request.cancel_url)
        .map_err(OrderError::from)?;

    let session = state
        .checkout_handler()
        .handle(CreateCheckoutCommand { order_id, urls })
        .await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(session))))
}

/// POST /payments/webhook - Payment succeeded notification
///
/// Redelivered events are acknowledged again without a second broadcast.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let result = state
        .webhook_handler()
        .handle(HandlePaymentWebhookCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;

    if !result.duplicate {
        let view = OrderView::from(&result.order);
        state
            .hub
            .broadcast(&result.order.id, MessageType::UpdateOrder, &view)
            .await;
    }

    Ok(Json(WebhookResponse {
        order_id: result.payment.order_id,
        payment_id: result.payment.id,
    }))
}
