//! Stripe Checkout for table orders.
//!
//! Each order item becomes one line at quantity 1 and a positive tip becomes
//! an extra line. The order id rides in the PaymentIntent metadata, which is
//! how `payment_intent.succeeded` webhooks find their order again.
//!
//! Webhooks are signed over `<t>.<raw body>` with HMAC-SHA256. Events older
//! than five minutes, or more than a minute ahead of our clock, are refused.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::OrderId;
use crate::domain::order::Order;
use crate::domain::payment::{CheckoutRequest, CheckoutSession, VerifiedPayment};
use crate::ports::{PaymentError, PaymentProvider};

use super::webhook_types::{
    hex_encode, SignatureHeader, StripeCheckoutSession, StripeErrorResponse, StripePaymentIntent,
    StripeWebhookEvent, PAYMENT_INTENT_SUCCEEDED,
};

type HmacSha256 = Hmac<Sha256>;

/// Provider name stored with recorded payments.
pub const STRIPE_PROVIDER: &str = "stripe";

const MAX_EVENT_AGE_SECS: i64 = 300;
const MAX_CLOCK_SKEW_SECS: i64 = 60;

const TIP_LINE_NAME: &str = "Tip for the staff";

#[derive(Clone)]
pub struct StripeConfig {
    api_key: SecretString,
    webhook_secret: SecretString,
    api_base_url: String,
    /// Refuse events whose `livemode` flag is false.
    require_livemode: bool,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            require_livemode: false,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("require_livemode", &self.require_livemode)
            .finish()
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Uses a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(config: StripeConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Extracts the charge from an already verified event body.
    fn parse_event(&self, payload: &[u8]) -> Result<VerifiedPayment, PaymentError> {
        let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("event body is not JSON: {}", e))
        })?;

        if self.config.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Rejected test mode event in production");
            return Err(PaymentError::invalid_webhook("test mode event refused"));
        }

        if event.event_type != PAYMENT_INTENT_SUCCEEDED {
            tracing::info!(
                event_id = %event.id,
                event_type = %event.event_type,
                "Ignoring unhandled Stripe event"
            );
            return Err(PaymentError::unhandled_event(&event.event_type));
        }

        let intent: StripePaymentIntent =
            serde_json::from_value(event.data.object).map_err(|e| {
                PaymentError::invalid_webhook(format!("malformed payment intent: {}", e))
            })?;

        let order_id: OrderId = intent
            .order_id()
            .ok_or_else(|| PaymentError::invalid_webhook("payment intent has no order_id metadata"))?
            .parse()
            .map_err(|_| PaymentError::invalid_webhook("order_id metadata is not a valid id"))?;

        tracing::info!(
            event_id = %event.id,
            payment_intent = %intent.id,
            order_id = %order_id,
            "Webhook signature verified"
        );

        Ok(VerifiedPayment {
            order_id,
            amount_in_cents: intent.settled_amount(),
            currency: intent.currency.to_lowercase(),
            provider: STRIPE_PROVIDER.to_string(),
            provider_payment_id: intent.id,
        })
    }

    async fn api_error(response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        classify_api_error(status, &body)
    }
}

/// Checks the header's timestamp window and looks for a matching `v1` signature.
///
/// `now` is unix seconds; any one matching signature is enough.
fn verify_signature(
    secret: &SecretString,
    payload: &[u8],
    header: &SignatureHeader,
    now: i64,
) -> Result<(), PaymentError> {
    let age = now
        .checked_sub(header.timestamp)
        .ok_or_else(|| PaymentError::invalid_webhook("timestamp out of range"))?;
    if age > MAX_EVENT_AGE_SECS {
        tracing::warn!(
            event_timestamp = header.timestamp,
            age_secs = age,
            "Stale webhook refused"
        );
        return Err(PaymentError::invalid_webhook(format!(
            "event too old ({}s)",
            age
        )));
    }
    if age < -MAX_CLOCK_SKEW_SECS {
        tracing::warn!(
            event_timestamp = header.timestamp,
            "Webhook timestamp ahead of our clock"
        );
        return Err(PaymentError::invalid_webhook("event timestamp in the future"));
    }

    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| PaymentError::invalid_webhook(format!("unusable signing secret: {}", e)))?;
    mac.update(header.timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    let matched = header
        .v1_signatures
        .iter()
        .any(|provided| bool::from(expected.as_slice().ct_eq(provided.as_slice())));
    if !matched {
        tracing::warn!(
            signatures = header.v1_signatures.len(),
            "Webhook signature mismatch"
        );
        return Err(PaymentError::invalid_webhook("signature mismatch"));
    }

    Ok(())
}

/// Maps a failed Stripe API call to the port's error.
fn classify_api_error(status: StatusCode, body: &str) -> PaymentError {
    let (message, provider_code) = match serde_json::from_str::<StripeErrorResponse>(body) {
        Ok(parsed) => (
            parsed.error.message.unwrap_or(parsed.error.error_type),
            parsed.error.code,
        ),
        Err(_) => (body.to_string(), None),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PaymentError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => PaymentError::RateLimited(message),
        s if s.is_server_error() => PaymentError::Unreachable(message),
        _ => PaymentError::Provider {
            message,
            provider_code,
        },
    }
}

/// Form parameters for a payment-mode Checkout session.
///
/// One line per order item at quantity 1, plus a tip line when the tip is
/// positive. The order id travels in the PaymentIntent metadata so the
/// webhook can find the order again.
fn checkout_params(order: &Order, success_url: &str, cancel_url: &str) -> Vec<(String, String)> {
    let currency = order.currency.to_lowercase();
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), success_url.to_string()),
        ("cancel_url".to_string(), cancel_url.to_string()),
        (
            "payment_intent_data[metadata][order_id]".to_string(),
            order.id.to_string(),
        ),
    ];

    let lines = order
        .items
        .iter()
        .map(|item| (item.name.as_str(), item.price_in_cents))
        .chain((order.tip_amount_in_cents > 0).then_some((TIP_LINE_NAME, order.tip_amount_in_cents)));

    for (i, (name, amount)) in lines.enumerate() {
        let prefix = format!("line_items[{}]", i);
        params.push((
            format!("{}[price_data][currency]", prefix),
            currency.clone(),
        ));
        params.push((
            format!("{}[price_data][product_data][name]", prefix),
            name.to_string(),
        ));
        params.push((
            format!("{}[price_data][unit_amount]", prefix),
            amount.to_string(),
        ));
        params.push((format!("{}[quantity]", prefix), "1".to_string()));
    }

    params
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    fn name(&self) -> &str {
        STRIPE_PROVIDER
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = checkout_params(
            &request.order,
            &request.urls.success_url,
            &request.urls.cancel_url,
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::api_error(response).await;
            tracing::warn!(order_id = %request.order.id, error = %err, "Stripe checkout failed");
            return Err(err);
        }

        let stripe_session: StripeCheckoutSession = response
            .json()
            .await
            .map_err(|e| PaymentError::provider(format!("unreadable checkout session: {}", e)))?;

        let url = stripe_session.url.ok_or_else(|| {
            PaymentError::provider(format!(
                "checkout session {} has no url",
                stripe_session.id
            ))
        })?;

        tracing::info!(
            order_id = %request.order.id,
            session_id = %stripe_session.id,
            "Created Stripe checkout session"
        );

        Ok(CheckoutSession {
            url,
            provider_session_id: stripe_session.id,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<VerifiedPayment, PaymentError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Unparseable Stripe-Signature header");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        verify_signature(
            &self.config.webhook_secret,
            payload,
            &header,
            chrono::Utc::now().timestamp(),
        )?;

        self.parse_event(payload)
    }
}

/// Builds a `Stripe-Signature` header value for `payload`.
///
/// Used by tests and local tooling that replay webhooks against the service.
pub fn sign_webhook_payload(secret: &str, timestamp: i64, payload: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Some(format!(
        "t={},v1={}",
        timestamp,
        hex_encode(&mac.finalize().into_bytes())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::test_support;
    use crate::domain::order::{OrderItem, OrderStatus};
    use crate::domain::payment::CheckoutUrls;

    const SECRET: &str = "whsec_test_secret";

    fn test_config() -> StripeConfig {
        StripeConfig::new("sk_test_key", SECRET)
    }

    fn create_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
        sign_webhook_payload(secret, timestamp, payload.as_bytes()).unwrap()
    }

    fn succeeded_payload(order_id: &str) -> String {
        format!(
            r#"{{
                "id": "evt_test",
                "type": "payment_intent.succeeded",
                "created": 1704067200,
                "livemode": false,
                "data": {{
                    "object": {{
                        "id": "pi_test_1",
                        "object": "payment_intent",
                        "amount": 2500,
                        "amount_received": 2500,
                        "currency": "EUR",
                        "metadata": {{"order_id": "{}"}}
                    }}
                }}
            }}"#,
            order_id
        )
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = StripeConfig::new("api_key", "webhook_secret");
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert!(!config.require_livemode);
    }

    #[test]
    fn config_with_base_url_trims_trailing_slash() {
        let config = StripeConfig::new("key", "secret").with_base_url("http://localhost:12111/");
        assert_eq!(config.api_base_url, "http://localhost:12111");
    }

    #[test]
    fn config_debug_redacts_secrets() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("sk_test_key"));
        assert!(!rendered.contains(SECRET));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ════════════════════════════════════════════════════════════════════════════

    const NOW: i64 = 1_767_225_600;
    const BODY: &[u8] = br#"{"id":"evt_test"}"#;

    fn header_for(secret: &str, timestamp: i64, payload: &[u8]) -> SignatureHeader {
        SignatureHeader::parse(&sign_webhook_payload(secret, timestamp, payload).unwrap()).unwrap()
    }

    fn check(header: &SignatureHeader, payload: &[u8]) -> Result<(), PaymentError> {
        verify_signature(&SecretString::new(SECRET.to_string()), payload, header, NOW)
    }

    #[test]
    fn signature_from_the_shared_secret_verifies() {
        assert!(check(&header_for(SECRET, NOW, BODY), BODY).is_ok());
    }

    #[test]
    fn one_matching_signature_among_several_is_enough() {
        let good = sign_webhook_payload(SECRET, NOW, BODY).unwrap();
        let good_hex = good.split("v1=").nth(1).unwrap();
        let header =
            SignatureHeader::parse(&format!("t={},v1={},v1={}", NOW, "00".repeat(32), good_hex))
                .unwrap();
        assert!(check(&header, BODY).is_ok());
    }

    #[test]
    fn signature_from_another_secret_is_refused() {
        let err = check(&header_for("whsec_other", NOW, BODY), BODY).unwrap_err();
        assert_eq!(err, PaymentError::invalid_webhook("signature mismatch"));
    }

    #[test]
    fn tampered_body_is_refused() {
        let header = header_for(SECRET, NOW, br#"{"amount":100}"#);
        assert!(check(&header, br#"{"amount":1}"#).is_err());
    }

    #[test]
    fn window_allows_five_minutes_back_and_one_minute_ahead() {
        assert!(check(&header_for(SECRET, NOW - 300, BODY), BODY).is_ok());
        assert!(check(&header_for(SECRET, NOW + 60, BODY), BODY).is_ok());

        let stale = check(&header_for(SECRET, NOW - 301, BODY), BODY).unwrap_err();
        assert!(stale.detail().contains("too old"));
        let early = check(&header_for(SECRET, NOW + 61, BODY), BODY).unwrap_err();
        assert!(early.detail().contains("future"));
    }

    #[test]
    fn extreme_header_timestamps_are_refused_without_overflow() {
        let min = SignatureHeader::parse(&format!("t={},v1=aa", i64::MIN)).unwrap();
        assert_eq!(
            check(&min, BODY).unwrap_err(),
            PaymentError::invalid_webhook("timestamp out of range")
        );

        let max = SignatureHeader::parse(&format!("t={},v1=aa", i64::MAX)).unwrap();
        assert!(check(&max, BODY).unwrap_err().detail().contains("future"));
    }

    #[tokio::test]
    async fn verify_webhook_survives_minimum_timestamp() {
        let adapter = StripePaymentAdapter::new(test_config());
        let err = adapter
            .verify_webhook(br#"{"id":"evt"}"#, "t=-9223372036854775808,v1=aa")
            .await
            .unwrap_err();
        assert!(err.is_webhook_rejection());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // API Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn card_errors_keep_stripe_message_and_code() {
        let body = r#"{"error":{"type":"invalid_request_error","code":"amount_too_small","message":"Amount must be at least 50 cents"}}"#;
        assert_eq!(
            classify_api_error(StatusCode::BAD_REQUEST, body),
            PaymentError::Provider {
                message: "Amount must be at least 50 cents".to_string(),
                provider_code: Some("amount_too_small".to_string()),
            }
        );
    }

    #[test]
    fn auth_throttle_and_outage_statuses_are_distinguished() {
        let body = r#"{"error":{"type":"api_error"}}"#;
        assert!(matches!(
            classify_api_error(StatusCode::UNAUTHORIZED, body),
            PaymentError::Unauthorized(_)
        ));
        assert!(classify_api_error(StatusCode::TOO_MANY_REQUESTS, body).is_retryable());
        assert_eq!(
            classify_api_error(StatusCode::BAD_GATEWAY, "upstream down"),
            PaymentError::Unreachable("upstream down".to_string())
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn verify_webhook_extracts_payment() {
        let adapter = StripePaymentAdapter::new(test_config());
        let order_id = OrderId::new();
        let payload = succeeded_payload(&order_id.to_string());
        let signature = create_test_signature(SECRET, chrono::Utc::now().timestamp(), &payload);

        let payment = adapter
            .verify_webhook(payload.as_bytes(), &signature)
            .await
            .unwrap();

        assert_eq!(payment.order_id, order_id);
        assert_eq!(payment.amount_in_cents, 2500);
        assert_eq!(payment.currency, "eur");
        assert_eq!(payment.provider, "stripe");
        assert_eq!(payment.provider_payment_id, "pi_test_1");
    }

    #[tokio::test]
    async fn verify_webhook_rejects_other_event_types() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_2","type":"charge.refunded","livemode":false,"data":{"object":{}}}"#;
        let signature = create_test_signature(SECRET, chrono::Utc::now().timestamp(), payload);

        let err = adapter
            .verify_webhook(payload.as_bytes(), &signature)
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::unhandled_event("charge.refunded"));
    }

    #[tokio::test]
    async fn verify_webhook_requires_order_metadata() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_3","type":"payment_intent.succeeded","livemode":false,"data":{"object":{"id":"pi_9","amount":100,"currency":"eur"}}}"#;
        let signature = create_test_signature(SECRET, chrono::Utc::now().timestamp(), payload);

        let err = adapter
            .verify_webhook(payload.as_bytes(), &signature)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidWebhook(_)));
    }

    #[tokio::test]
    async fn verify_webhook_rejects_malformed_order_id() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = succeeded_payload("table-7");
        let signature = create_test_signature(SECRET, chrono::Utc::now().timestamp(), &payload);

        let err = adapter
            .verify_webhook(payload.as_bytes(), &signature)
            .await
            .unwrap_err();
        assert!(err.detail().contains("not a valid id"));
    }

    #[tokio::test]
    async fn verify_webhook_rejects_test_events_when_livemode_required() {
        let adapter = StripePaymentAdapter::new(test_config().with_require_livemode(true));
        let payload = succeeded_payload(&OrderId::new().to_string());
        let signature = create_test_signature(SECRET, chrono::Utc::now().timestamp(), &payload);

        let err = adapter
            .verify_webhook(payload.as_bytes(), &signature)
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::invalid_webhook("test mode event refused"));
    }

    #[tokio::test]
    async fn verify_webhook_rejects_garbage_header() {
        let adapter = StripePaymentAdapter::new(test_config());
        let err = adapter
            .verify_webhook(b"{}", "not-a-signature")
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidWebhook(_)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Checkout Parameter Tests
    // ════════════════════════════════════════════════════════════════════════════

    fn order_with_items(tip: i64) -> Order {
        let mut order = test_support::order(OrderStatus::Locked);
        order.currency = "EUR".to_string();
        order.tip_amount_in_cents = tip;
        let restaurant = order.restaurant_id;
        order.items = vec![
            OrderItem::from_menu_item(&test_support::menu_item(restaurant, "Soup", 650)),
            OrderItem::from_menu_item(&test_support::menu_item(restaurant, "Bread", 250)),
        ];
        order
    }

    #[test]
    fn checkout_params_list_each_item_once() {
        let order = order_with_items(0);
        let params = checkout_params(&order, "https://ok", "https://cancel");

        assert_eq!(param(&params, "mode"), Some("payment"));
        assert_eq!(param(&params, "line_items[0][price_data][product_data][name]"), Some("Soup"));
        assert_eq!(param(&params, "line_items[0][price_data][unit_amount]"), Some("650"));
        assert_eq!(param(&params, "line_items[1][price_data][currency]"), Some("eur"));
        assert_eq!(param(&params, "line_items[1][quantity]"), Some("1"));
        assert_eq!(param(&params, "line_items[2][quantity]"), None);
        assert_eq!(
            param(&params, "payment_intent_data[metadata][order_id]"),
            Some(order.id.to_string().as_str())
        );
    }

    #[test]
    fn checkout_params_add_tip_line() {
        let order = order_with_items(300);
        let params = checkout_params(&order, "https://ok", "https://cancel");

        assert_eq!(
            param(&params, "line_items[2][price_data][product_data][name]"),
            Some(TIP_LINE_NAME)
        );
        assert_eq!(param(&params, "line_items[2][price_data][unit_amount]"), Some("300"));
    }

    #[test]
    fn checkout_params_carry_redirect_urls() {
        let order = order_with_items(0);
        let urls = CheckoutUrls::new("https://menu.test/paid", "https://menu.test/back").unwrap();
        let params = checkout_params(&order, &urls.success_url, &urls.cancel_url);

        assert_eq!(param(&params, "success_url"), Some("https://menu.test/paid"));
        assert_eq!(param(&params, "cancel_url"), Some("https://menu.test/back"));
    }
}
