//! Payment processor adapter.
//!
//! Implements the processor-facing ports:
//! - Webhook signature verification and event parsing (`EventVerifier`)
//! - Line-items lookup for eligibility classification (`SessionLookup`)
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`

mod client;
mod events;
mod signature;
mod verifier;

pub use client::{StripeClient, StripeClientConfig};
pub use events::{StripeCheckoutSession, StripeWebhookEvent};
pub use signature::{hex_encode, SignatureHeader, SignatureVerifier};
pub use verifier::StripeEventVerifier;
