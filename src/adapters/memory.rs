//! In-memory processed-session store.
//!
//! Best-effort dedup gate for redelivered webhooks. Entries expire after a
//! TTL and the whole record is lost on restart; the label-presence check in
//! the reconciler remains the backstop for those cases.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::ports::ProcessedSessionStore;

/// Default retention for processed session ids (24 hours).
const DEFAULT_TTL_HOURS: i64 = 24;

/// TTL-bounded in-memory session store.
pub struct InMemoryProcessedSessionStore {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
    ttl: Duration,
}

impl InMemoryProcessedSessionStore {
    /// Create a store with the default 24-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Create a store with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn is_fresh(&self, recorded_at: &DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - *recorded_at < self.ttl
    }
}

impl Default for InMemoryProcessedSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessedSessionStore for InMemoryProcessedSessionStore {
    async fn contains(&self, session_id: &str) -> bool {
        let now = Utc::now();
        let entries = self.entries.read().await;
        entries
            .get(session_id)
            .is_some_and(|recorded_at| self.is_fresh(recorded_at, now))
    }

    async fn mark_processed(&self, session_id: &str) {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        // Prune expired entries while the write lock is held so the map
        // stays bounded by the delivery rate within one TTL window.
        entries.retain(|_, recorded_at| self.is_fresh(recorded_at, now));
        entries.insert(session_id.to_string(), now);
    }
}
