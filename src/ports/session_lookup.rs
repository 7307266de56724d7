//! Session lookup port for the payment processor.
//!
//! Classification strategy 3 needs the purchased line items, which the
//! webhook payload does not always carry. This port fetches them from the
//! processor ("retrieve session with expanded line items").

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::LineItem;

/// Port for retrieving a session's purchased line items.
#[async_trait]
pub trait SessionLookup: Send + Sync {
    /// Fetch the line items purchased in the given session.
    async fn line_items(&self, session_id: &str) -> Result<Vec<LineItem>, LookupError>;
}

/// Errors from the processor lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Transport-level failure; no response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The processor returned a non-success response.
    #[error("Processor API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A success response could not be decoded.
    #[error("Failed to parse processor response: {0}")]
    Parse(String),
}

impl LookupError {
    /// True when a second attempt might succeed (the caller retries once).
    pub fn is_transient(&self) -> bool {
        match self {
            LookupError::Network(_) => true,
            LookupError::Api { status, .. } => *status == 429 || *status >= 500,
            LookupError::Parse(_) => false,
        }
    }
}
