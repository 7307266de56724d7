//! Verified webhook events.

use crate::domain::session::PurchaseSession;

/// Event kind that carries a completed purchase.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// A webhook event whose signature has been verified.
///
/// Only constructed by a verifier implementation after the HMAC check
/// succeeds; the pipeline never sees unverified payloads.
#[derive(Debug, Clone)]
pub struct VerifiedEvent {
    /// Processor event id (evt_...).
    pub id: String,

    /// Raw event kind string (e.g. "checkout.session.completed").
    pub kind: String,

    /// The purchase session, present only for checkout-completed events.
    pub session: Option<PurchaseSession>,
}

impl VerifiedEvent {
    /// Whether this event represents a completed checkout.
    pub fn is_checkout_completed(&self) -> bool {
        self.kind == CHECKOUT_COMPLETED
    }
}
