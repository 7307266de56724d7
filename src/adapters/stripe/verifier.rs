//! Webhook event verifier for the payment processor.
//!
//! Implements the [`EventVerifier`] port: parses the signature header,
//! checks the HMAC over the raw bytes, and only then parses the payload
//! into a [`VerifiedEvent`].

use crate::domain::{VerifiedEvent, WebhookError, CHECKOUT_COMPLETED};
use crate::ports::EventVerifier;

use super::events::{StripeCheckoutSession, StripeWebhookEvent};
use super::signature::{SignatureHeader, SignatureVerifier};

/// Signature-checking event verifier.
pub struct StripeEventVerifier {
    signature: SignatureVerifier,
}

impl StripeEventVerifier {
    /// Create a verifier with the given webhook signing secret.
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            signature: SignatureVerifier::new(webhook_secret),
        }
    }

    fn parse_event(&self, payload: &[u8]) -> Result<VerifiedEvent, WebhookError> {
        let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            WebhookError::ParseError(format!("Invalid JSON: {}", e))
        })?;

        let session = if event.event_type == CHECKOUT_COMPLETED {
            let session: StripeCheckoutSession = serde_json::from_value(event.data.object)
                .map_err(|e| {
                    WebhookError::ParseError(format!("Invalid checkout session: {}", e))
                })?;
            Some(session.into_domain())
        } else {
            None
        };

        Ok(VerifiedEvent {
            id: event.id,
            kind: event.event_type,
            session,
        })
    }
}

impl EventVerifier for StripeEventVerifier {
    fn verify(&self, payload: &[u8], signature: &str) -> Result<VerifiedEvent, WebhookError> {
        let header = SignatureHeader::parse(signature)?;
        self.signature.verify(payload, &header)?;

        let event = self.parse_event(payload)?;

        tracing::info!(
            event_id = %event.id,
            event_kind = %event.kind,
            "Webhook signature verified"
        );

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    use super::super::signature::hex_encode;

    fn sign(secret: &str, timestamp: i64, payload: &str) -> String {
        let signed_payload = format!("{}.{}", timestamp, payload);
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        format!("t={},v1={}", timestamp, hex_encode(&mac.finalize().into_bytes()))
    }

    const SECRET: &str = "whsec_test_secret";

    fn checkout_payload() -> &'static str {
        r#"{
            "id": "evt_test123",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": {
                "object": {
                    "id": "cs_test",
                    "customer_email": "jane@example.com",
                    "metadata": {"Label": "RT2025"}
                }
            },
            "livemode": false
        }"#
    }

    #[test]
    fn verify_accepts_valid_signature_and_payload() {
        let verifier = StripeEventVerifier::new(SECRET);
        let payload = checkout_payload();
        let signature = sign(SECRET, chrono::Utc::now().timestamp(), payload);

        let event = verifier.verify(payload.as_bytes(), &signature).unwrap();

        assert_eq!(event.id, "evt_test123");
        assert!(event.is_checkout_completed());
        let session = event.session.unwrap();
        assert_eq!(session.id, "cs_test");
        assert_eq!(session.customer_email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let verifier = StripeEventVerifier::new(SECRET);
        let payload = checkout_payload();
        let signature = sign("whsec_other", chrono::Utc::now().timestamp(), payload);

        let result = verifier.verify(payload.as_bytes(), &signature);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_rejects_malformed_header() {
        let verifier = StripeEventVerifier::new(SECRET);
        let result = verifier.verify(checkout_payload().as_bytes(), "malformed_header");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn verify_rejects_invalid_json() {
        let verifier = StripeEventVerifier::new(SECRET);
        let payload = "not valid json";
        let signature = sign(SECRET, chrono::Utc::now().timestamp(), payload);

        let result = verifier.verify(payload.as_bytes(), &signature);
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn non_checkout_events_carry_no_session() {
        let verifier = StripeEventVerifier::new(SECRET);
        let payload = r#"{
            "id": "evt_other",
            "type": "invoice.paid",
            "data": {"object": {"id": "in_123"}},
            "livemode": false
        }"#;
        let signature = sign(SECRET, chrono::Utc::now().timestamp(), payload);

        let event = verifier.verify(payload.as_bytes(), &signature).unwrap();
        assert!(!event.is_checkout_completed());
        assert!(event.session.is_none());
    }
}
