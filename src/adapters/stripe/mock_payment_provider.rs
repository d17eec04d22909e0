//! In-process payment provider for tests and local runs.
//!
//! Checkouts get a generated `cs_mock_*` session unless one is queued.
//! Webhook verification ignores the signature and hands back the configured
//! payment, so tests can replay the same charge as often as they like.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::payment::{CheckoutRequest, CheckoutSession, VerifiedPayment};
use crate::ports::{PaymentError, PaymentProvider};

/// Cloning shares state, so a test can keep a handle after passing one to
/// the app.
#[derive(Clone, Default)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    queued_session: Option<CheckoutSession>,
    webhook_payment: Option<VerifiedPayment>,
    checkout_failure: Option<PaymentError>,
    webhook_failure: Option<PaymentError>,
    checkout_requests: Vec<CheckoutRequest>,
    webhooks_seen: usize,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returned by the next checkout instead of a generated session.
    pub fn queue_checkout_session(&self, session: CheckoutSession) {
        self.state().queued_session = Some(session);
    }

    /// The charge every webhook verifies to.
    pub fn set_webhook_payment(&self, payment: VerifiedPayment) {
        self.state().webhook_payment = Some(payment);
    }

    /// Every checkout fails with `error` until [`Self::recover`].
    pub fn fail_checkouts(&self, error: PaymentError) {
        self.state().checkout_failure = Some(error);
    }

    /// Every webhook fails with `error` until [`Self::recover`].
    pub fn fail_webhooks(&self, error: PaymentError) {
        self.state().webhook_failure = Some(error);
    }

    pub fn recover(&self) {
        let mut state = self.state();
        state.checkout_failure = None;
        state.webhook_failure = None;
    }

    /// Every checkout attempted, failed ones included.
    pub fn checkout_requests(&self) -> Vec<CheckoutRequest> {
        self.state().checkout_requests.clone()
    }

    pub fn webhooks_seen(&self) -> usize {
        self.state().webhooks_seen
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.state();
        state.checkout_requests.push(request.clone());
        if let Some(error) = &state.checkout_failure {
            return Err(error.clone());
        }

        Ok(state.queued_session.take().unwrap_or_else(|| {
            let id = format!("cs_mock_{}", uuid::Uuid::new_v4().simple());
            CheckoutSession {
                url: format!("https://checkout.mock.test/pay/{}", id),
                provider_session_id: id,
            }
        }))
    }

    async fn verify_webhook(
        &self,
        _payload: &[u8],
        _signature: &str,
    ) -> Result<VerifiedPayment, PaymentError> {
        let mut state = self.state();
        state.webhooks_seen += 1;
        if let Some(error) = &state.webhook_failure {
            return Err(error.clone());
        }

        state
            .webhook_payment
            .clone()
            .ok_or_else(|| PaymentError::invalid_webhook("no webhook payment configured"))
    }
}
