//! Webhook signature header parsing and HMAC-SHA256 verification.
//!
//! The processor signs `"{timestamp}.{raw_body}"` with the endpoint's
//! shared secret and sends the result in the `Stripe-Signature` header:
//!
//! ```text
//! t=<timestamp>,v1=<signature>[,v0=<legacy_signature>]
//! ```
//!
//! # Security
//!
//! - Constant-time signature comparison to prevent timing attacks
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secret handled via `secrecy::SecretString`

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Parsed signature header components.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    /// Unix timestamp when the processor generated the event.
    pub timestamp: i64,

    /// Primary v1 signature (HMAC-SHA256, hex-encoded).
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parse a signature header into components.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        if header.is_empty() {
            return Err(WebhookError::ParseError(
                "Missing signature header".to_string(),
            ));
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                return Err(WebhookError::ParseError(
                    "Malformed signature header".to_string(),
                ));
            };

            match key.trim() {
                "t" => {
                    timestamp = Some(value.trim().parse().map_err(|_| {
                        WebhookError::ParseError("Invalid timestamp format".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex_decode(value.trim()).ok_or_else(|| {
                        WebhookError::ParseError("Signature is not valid hex".to_string())
                    })?);
                }
                _ => {
                    // Ignore v0 and unknown fields for forward compatibility
                }
            }
        }

        Ok(Self {
            timestamp: timestamp.ok_or_else(|| {
                WebhookError::ParseError("Missing timestamp (t=) in signature".to_string())
            })?,
            v1_signature: v1_signature.ok_or_else(|| {
                WebhookError::ParseError("Missing v1 signature in header".to_string())
            })?,
        })
    }
}

/// HMAC-SHA256 signature verifier bound to an endpoint secret.
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    /// Create a verifier with the given webhook signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Verify a signature header against the raw payload bytes.
    pub fn verify(&self, payload: &[u8], header: &SignatureHeader) -> Result<(), WebhookError> {
        // 1. Validate timestamp (prevent replay attacks)
        let now = chrono::Utc::now().timestamp();
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(WebhookError::TimestampOutOfRange);
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(WebhookError::InvalidTimestamp);
        }

        // 2. Compute expected signature over "{timestamp}.{body}"
        let signed_payload = format!(
            "{}.{}",
            header.timestamp,
            String::from_utf8_lossy(payload)
        );

        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        // 3. Constant-time comparison
        let expected_bytes: &[u8] = expected.as_slice();
        let provided_bytes: &[u8] = &header.v1_signature;

        if expected_bytes.ct_eq(provided_bytes).unwrap_u8() != 1 {
            tracing::warn!("Invalid webhook signature");
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }
}

/// Decode a hex string to bytes.
fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = u8::from_str_radix(&hex[i..i + 2], 16).ok()?;
        bytes.push(byte);
    }
    Some(bytes)
}

/// Encode bytes to hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
