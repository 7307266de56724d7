//! Error taxonomy for webhook pipeline processing.
//!
//! Each variant maps to exactly one HTTP status; the status decides whether
//! the payment processor redelivers the event (2xx/4xx: no, 5xx: yes).

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while processing a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature verification failed (wrong secret or tampered body).
    #[error("Invalid signature")]
    InvalidSignature,

    /// Event timestamp is older than the replay window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the signature header or the event payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Verified, eligible session carries no customer email.
    #[error("No customer email")]
    MissingEmail,

    /// The processor line-items lookup failed after its retry.
    #[error("Line item lookup failed: {0}")]
    LineItemLookupFailed(String),

    /// The contact directory rejected a search, create, or patch call.
    #[error("Directory error ({status}): {body}")]
    Directory { status: u16, body: String },
}

impl WebhookError {
    /// Returns true if the processor should redeliver this event.
    ///
    /// Only downstream failures are worth a redelivery; authentication and
    /// payload problems will fail identically every time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::LineItemLookupFailed(_) | WebhookError::Directory { .. }
        )
    }

    /// Maps the error to its HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingEmail => StatusCode::BAD_REQUEST,

            WebhookError::LineItemLookupFailed(_) | WebhookError::Directory { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_email_displays_expected_message() {
        assert_eq!(format!("{}", WebhookError::MissingEmail), "No customer email");
    }

    #[test]
    fn directory_error_carries_upstream_status_and_body() {
        let err = WebhookError::Directory {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(format!("{}", err), "Directory error (403): forbidden");
    }

    #[test]
    fn verification_failures_map_to_bad_request() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::TimestampOutOfRange.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::ParseError("bad json".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::MissingEmail.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn downstream_failures_map_to_internal_error() {
        assert_eq!(
            WebhookError::LineItemLookupFailed("timeout".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::Directory {
                status: 500,
                body: String::new()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn only_downstream_failures_are_retryable() {
        assert!(WebhookError::LineItemLookupFailed("net".to_string()).is_retryable());
        assert!(WebhookError::Directory {
            status: 502,
            body: String::new()
        }
        .is_retryable());

        assert!(!WebhookError::InvalidSignature.is_retryable());
        assert!(!WebhookError::MissingEmail.is_retryable());
        assert!(!WebhookError::ParseError("x".to_string()).is_retryable());
    }
}
