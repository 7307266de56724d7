//! Response DTOs for the webhook endpoint.

use serde::{Deserialize, Serialize};

/// Acknowledgement body for processed or skipped events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,

    /// Reason the event was skipped, absent for processed events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl WebhookAck {
    /// Acknowledgement for a fully processed event.
    pub fn processed() -> Self {
        Self {
            received: true,
            skipped: None,
        }
    }

    /// Acknowledgement for an event that was received but not acted on.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            received: true,
            skipped: Some(reason.into()),
        }
    }
}

/// Error body for rejected or failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
