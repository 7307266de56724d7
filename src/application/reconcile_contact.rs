//! ReconcileContactHandler - Upserts a customer into the contact directory.
//!
//! Looks up the canonical contact by email, then either creates a new
//! contact carrying the target label or merges the label into the existing
//! one. A contact that already carries the label is left untouched so
//! redelivered events cost no directory writes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{CustomerIdentity, WebhookError};
use crate::ports::{
    ContactDirectory, ContactDraft, ContactPatch, DirectoryContact, ReconciliationAction,
    ReconciliationResult,
};

/// Extended field carrying the last purchase amount in major units.
pub const LAST_PURCHASE_AMOUNT_FIELD: &str = "custom.lastPurchaseAmount";

/// Extended field carrying the last purchase date (RFC 3339).
pub const LAST_PURCHASE_DATE_FIELD: &str = "custom.lastPurchaseDate";

/// Extended field carrying the payment session id of the last purchase.
pub const LAST_SESSION_ID_FIELD: &str = "custom.lastPaymentSessionId";

/// Purchase metadata recorded on the contact alongside the label.
#[derive(Debug, Clone)]
pub struct PurchaseDetails {
    /// Amount in major currency units, when the session carried one.
    pub amount: Option<f64>,

    /// Processing timestamp, RFC 3339.
    pub date: String,

    /// Payment session id.
    pub session_id: String,
}

/// Handler for the contact upsert.
pub struct ReconcileContactHandler {
    directory: Arc<dyn ContactDirectory>,
    target_label: String,
}

impl ReconcileContactHandler {
    pub fn new(directory: Arc<dyn ContactDirectory>, target_label: impl Into<String>) -> Self {
        Self {
            directory,
            target_label: target_label.into(),
        }
    }

    /// Upsert the identity into the directory.
    ///
    /// Guarantees:
    /// - at most one write per invocation (create or patch, never both
    ///   unless a create conflict forces the update path);
    /// - no write at all when the contact already carries the label.
    pub async fn handle(
        &self,
        identity: &CustomerIdentity,
        purchase: &PurchaseDetails,
    ) -> Result<ReconciliationResult, WebhookError> {
        let matches = self.directory.search_by_email(&identity.email).await?;

        if matches.len() > 1 {
            // Known limitation: the first returned contact is canonical.
            tracing::warn!(
                email = %identity.email,
                count = matches.len(),
                "Multiple directory contacts share this email, using the first"
            );
        }

        match matches.into_iter().next() {
            Some(contact) => self.merge_label(contact, purchase).await,
            None => self.create_contact(identity, purchase).await,
        }
    }

    async fn create_contact(
        &self,
        identity: &CustomerIdentity,
        purchase: &PurchaseDetails,
    ) -> Result<ReconciliationResult, WebhookError> {
        let draft = ContactDraft {
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            email: identity.email.clone(),
            phone: Some(identity.phone.clone()).filter(|phone| !phone.is_empty()),
            label_key: self.target_label.clone(),
            extended_fields: self.extended_fields(purchase),
        };

        match self.directory.create(&draft).await {
            Ok(contact) => {
                tracing::info!(
                    contact_id = %contact.id,
                    email = %identity.email,
                    "Created directory contact"
                );
                Ok(ReconciliationResult {
                    action: ReconciliationAction::Created,
                    contact_id: contact.id,
                })
            }
            Err(err) if err.is_duplicate() => {
                // Lost a search-then-create race: someone inserted this
                // contact between our search and create. Retry as update.
                tracing::warn!(
                    email = %identity.email,
                    "Contact already exists, retrying as update"
                );
                let contact = self
                    .directory
                    .search_by_email(&identity.email)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| WebhookError::from(err))?;
                self.merge_label(contact, purchase).await
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn merge_label(
        &self,
        contact: DirectoryContact,
        purchase: &PurchaseDetails,
    ) -> Result<ReconciliationResult, WebhookError> {
        if contact.has_label(&self.target_label) {
            tracing::info!(
                contact_id = %contact.id,
                "Contact already labeled, skipping write"
            );
            return Ok(ReconciliationResult {
                action: ReconciliationAction::Unchanged,
                contact_id: contact.id,
            });
        }

        let mut label_keys = contact.label_keys.clone();
        label_keys.push(self.target_label.clone());

        let patch = ContactPatch {
            label_keys,
            extended_fields: self.extended_fields(purchase),
        };

        let updated = self.directory.patch(&contact.id, &patch).await?;
        tracing::info!(
            contact_id = %updated.id,
            "Merged label into existing contact"
        );

        Ok(ReconciliationResult {
            action: ReconciliationAction::Updated,
            contact_id: updated.id,
        })
    }

    fn extended_fields(&self, purchase: &PurchaseDetails) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        if let Some(amount) = purchase.amount {
            fields.insert(LAST_PURCHASE_AMOUNT_FIELD.to_string(), format!("{:.2}", amount));
        }
        fields.insert(LAST_PURCHASE_DATE_FIELD.to_string(), purchase.date.clone());
        fields.insert(LAST_SESSION_ID_FIELD.to_string(), purchase.session_id.clone());
        fields
    }
}
