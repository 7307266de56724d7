//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `verifier` - Webhook signature verification
//! - `directory` - Contact directory search/create/patch
//! - `session_lookup` - Processor line-items retrieval
//! - `processed_sessions` - Reconciled-session dedup gate

mod directory;
mod processed_sessions;
mod session_lookup;
mod verifier;

pub use directory::{
    ContactDirectory, ContactDraft, ContactPatch, DirectoryContact, DirectoryError,
    ReconciliationAction, ReconciliationResult,
};
pub use processed_sessions::ProcessedSessionStore;
pub use session_lookup::{LookupError, SessionLookup};
pub use verifier::EventVerifier;
