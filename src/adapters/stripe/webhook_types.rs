//! Stripe wire types for checkout and payment webhooks.
//!
//! Only the fields this service reads are modelled; everything else in the
//! Stripe payload is ignored by serde.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureParseError {
    #[error("Stripe-Signature header is empty")]
    MissingHeader,
    #[error("Stripe-Signature header has no t= entry")]
    MissingTimestamp,
    #[error("Stripe-Signature header has no v1= entry")]
    MissingV1Signature,
    #[error("Stripe-Signature timestamp is not an integer")]
    InvalidTimestamp,
    #[error("Stripe-Signature v1 value is not hex")]
    InvalidSignatureFormat,
}

/// Parsed `Stripe-Signature` header: `t=<unix>,v1=<hex>[,v1=<hex>...]`.
///
/// Stripe sends one `v1` entry per active signing secret while a secret is
/// being rolled, so every `v1` value is kept.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.trim().is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(SignatureParseError::MissingTimestamp)?;

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    let signature =
                        hex_decode(value).ok_or(SignatureParseError::InvalidSignatureFormat)?;
                    v1_signatures.push(signature);
                }
                // v0 and future schemes are not trusted
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| hex.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════════

/// The only event type that settles an order.
pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";

#[derive(Debug, Clone, Deserialize)]
pub struct StripeWebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// PaymentIntent as carried in `data.object`. Amounts are minor units.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub amount_received: Option<i64>,
    pub currency: String,
    /// Copied from `payment_intent_data[metadata]` when the checkout was opened.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripePaymentIntent {
    /// Metadata key holding the order the checkout was opened for.
    pub const ORDER_ID_KEY: &'static str = "order_id";

    /// Received amount, falling back to the intended amount.
    pub fn settled_amount(&self) -> i64 {
        self.amount_received
            .filter(|received| *received > 0)
            .unwrap_or(self.amount)
    }

    pub fn order_id(&self) -> Option<&str> {
        self.metadata.get(Self::ORDER_ID_KEY).map(String::as_str)
    }
}

/// Response of `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    /// Absent once the session has expired.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
