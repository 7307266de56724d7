//! ProcessedSessionStore port - tracks which payment sessions were handled.
//!
//! Webhook deliveries may repeat (processor retries, duplicate sends). The
//! label-presence check already makes relabeling a no-op, but it cannot stop
//! extended-field overwrites or redundant directory calls. This store records
//! session ids that completed reconciliation so redeliveries short-circuit
//! before any directory traffic.
//!
//! The store is a best-effort gate, not a durable log: implementations may
//! forget entries (TTL expiry, process restart), in which case the
//! label-presence check remains the backstop.

use async_trait::async_trait;

/// Port for tracking reconciled payment sessions.
#[async_trait]
pub trait ProcessedSessionStore: Send + Sync {
    /// Whether this session id has already been reconciled.
    async fn contains(&self, session_id: &str) -> bool;

    /// Record a session id after successful reconciliation.
    async fn mark_processed(&self, session_id: &str);
}
