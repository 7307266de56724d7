//! Contact directory port for the external relationship-management service.
//!
//! Defines the contract for directory integrations (e.g., Wix Contacts).
//! Implementations handle contact search, creation, and partial updates;
//! the application layer owns the upsert semantics built on top.
//!
//! # Design
//!
//! - **Directory agnostic**: the pipeline never sees wire formats
//! - **Read-and-patch**: contacts are owned by the external service and
//!   never held beyond one request
//! - **No retries here**: retry policy belongs to the caller

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::WebhookError;

/// Port for contact directory integrations.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// Search contacts by exact email match.
    ///
    /// May return more than one contact; the caller treats the first as
    /// canonical.
    async fn search_by_email(&self, email: &str)
        -> Result<Vec<DirectoryContact>, DirectoryError>;

    /// Create a new contact from a draft.
    async fn create(&self, draft: &ContactDraft) -> Result<DirectoryContact, DirectoryError>;

    /// Partially update a contact's labels and extended fields.
    ///
    /// All other contact fields must be left untouched by implementations.
    async fn patch(
        &self,
        contact_id: &str,
        patch: &ContactPatch,
    ) -> Result<DirectoryContact, DirectoryError>;
}

/// A contact as read from the directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryContact {
    /// Directory-assigned contact id.
    pub id: String,

    /// Known email addresses.
    pub emails: Vec<String>,

    /// First name on record.
    pub first_name: String,

    /// Last name on record.
    pub last_name: String,

    /// Known phone numbers.
    pub phones: Vec<String>,

    /// Marketing label keys attached to the contact.
    pub label_keys: Vec<String>,

    /// Extended (custom) fields.
    pub extended_fields: HashMap<String, String>,
}

impl DirectoryContact {
    /// Whether the contact already carries the given label.
    pub fn has_label(&self, label_key: &str) -> bool {
        self.label_keys.iter().any(|key| key == label_key)
    }
}

/// Payload for creating a new contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,

    /// Primary email, always present.
    pub email: String,

    /// Primary phone; omitted from the wire payload when `None`.
    pub phone: Option<String>,

    /// Label applied on creation.
    pub label_key: String,

    /// Extended fields carrying last-purchase metadata.
    pub extended_fields: HashMap<String, String>,
}

/// Partial update of a contact: label set and extended fields only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPatch {
    /// Full replacement label set (existing labels plus the new one).
    pub label_keys: Vec<String>,

    /// Extended fields to merge.
    pub extended_fields: HashMap<String, String>,
}

/// What the reconciler did with a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationAction {
    /// A new contact was created.
    Created,

    /// An existing contact gained the label.
    Updated,

    /// The contact already carried the label; nothing was written.
    Unchanged,
}

/// Outcome of a reconciliation, for logging and the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub action: ReconciliationAction,
    pub contact_id: String,
}

/// Errors from directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Transport-level failure; no response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The directory returned a non-success response.
    #[error("Directory API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The directory rejected a create because the contact already exists.
    #[error("Duplicate contact: {0}")]
    DuplicateContact(String),

    /// A success response could not be decoded.
    #[error("Failed to parse directory response: {0}")]
    Parse(String),
}

impl DirectoryError {
    /// True when a create failure signals an existing contact, which the
    /// reconciler retries as an update.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DirectoryError::DuplicateContact(_))
    }
}

impl From<DirectoryError> for WebhookError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Api { status, body } => WebhookError::Directory { status, body },
            // No upstream status exists for transport failures; 502 records
            // that the directory itself was never reached.
            DirectoryError::Network(message) => WebhookError::Directory {
                status: 502,
                body: message,
            },
            DirectoryError::DuplicateContact(message) => WebhookError::Directory {
                status: 409,
                body: message,
            },
            DirectoryError::Parse(message) => WebhookError::Directory {
                status: 502,
                body: message,
            },
        }
    }
}
