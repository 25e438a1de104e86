//! Hosted-checkout payment gateway
//!
//! Provider-neutral binding: sessions are opaque ids redirecting to a hosted
//! payment page, and inbound notifications carry a hex HMAC-SHA256 of the
//! raw body in the `X-Webhook-Signature` header. A Stripe- or
//! Razorpay-shaped deployment implements the same trait and translates the
//! provider's callback into this contract.

use async_trait::async_trait;
use ring::hmac;

use super::{CheckoutSession, GatewayResult, PaymentGateway, SessionRequest};

pub struct HostedCheckoutGateway {
    key: hmac::Key,
    checkout_base_url: String,
}

impl HostedCheckoutGateway {
    pub fn new(webhook_secret: &str, checkout_base_url: impl Into<String>) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, webhook_secret.as_bytes()),
            checkout_base_url: checkout_base_url.into(),
        }
    }

    /// Signature for an outbound payload; used by tests and by deployments
    /// that loop the notification back through this server.
    pub fn sign(&self, payload: &[u8]) -> String {
        hex::encode(hmac::sign(&self.key, payload).as_ref())
    }
}

#[async_trait]
impl PaymentGateway for HostedCheckoutGateway {
    async fn create_session(&self, request: &SessionRequest) -> GatewayResult<CheckoutSession> {
        let session_id = format!("cs_{}", uuid::Uuid::new_v4().simple());
        let pay_url = format!(
            "{}/pay/{}?amount={}&currency={}&success={}&cancel={}",
            self.checkout_base_url,
            session_id,
            request.amount_cents,
            request.currency,
            request.success_ref,
            request.cancel_ref,
        );

        tracing::debug!(
            session_id = %session_id,
            amount_cents = request.amount_cents,
            "Opened checkout session"
        );

        Ok(CheckoutSession {
            session_id,
            pay_url,
        })
    }

    fn verify_notification(&self, payload: &[u8], signature: &str) -> bool {
        let Ok(provided) = hex::decode(signature.trim()) else {
            return false;
        };
        // Constant-time comparison
        hmac::verify(&self.key, payload, &provided).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_get_unique_ids() {
        let gw = HostedCheckoutGateway::new("secret", "https://pay.example.com");
        let request = SessionRequest {
            amount_cents: 2500,
            currency: "USD".into(),
            description: "Event Ticket".into(),
            success_ref: "42".into(),
            cancel_ref: "42".into(),
        };
        let a = gw.create_session(&request).await.unwrap();
        let b = gw.create_session(&request).await.unwrap();
        assert_ne!(a.session_id, b.session_id);
        assert!(a.pay_url.contains(&a.session_id));
    }

    #[test]
    fn verifies_only_matching_signatures() {
        let gw = HostedCheckoutGateway::new("secret", "https://pay.example.com");
        let payload = br#"{"type":"checkout.completed","session_id":"cs_1"}"#;
        let sig = gw.sign(payload);

        assert!(gw.verify_notification(payload, &sig));
        assert!(!gw.verify_notification(b"tampered", &sig));
        assert!(!gw.verify_notification(payload, "deadbeef"));
        assert!(!gw.verify_notification(payload, "not-hex!"));

        let other = HostedCheckoutGateway::new("other-secret", "https://pay.example.com");
        assert!(!other.verify_notification(payload, &sig));
    }
}
