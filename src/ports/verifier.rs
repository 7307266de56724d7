//! Event verifier port.
//!
//! Authenticates that an inbound payload genuinely originated from the
//! payment processor. Implementations must operate on the raw bytes exactly
//! as received; any prior decoding or re-serialization invalidates the
//! signature.

use crate::domain::{VerifiedEvent, WebhookError};

/// Port for webhook signature verification and event parsing.
pub trait EventVerifier: Send + Sync {
    /// Verify the signature over the raw body and parse the event.
    ///
    /// Failure is terminal for the request; the caller maps it to a client
    /// error and never retries.
    fn verify(&self, payload: &[u8], signature: &str) -> Result<VerifiedEvent, WebhookError>;
}
