//! Customer identity extraction from heterogeneous session payloads.
//!
//! Payloads disagree on where the customer's name lives: some checkouts
//! collect a structured last-name custom field (under a configurable key or
//! label), others only carry a free-text display name. Extraction prefers
//! the structured field and falls back to splitting the display name.

use crate::domain::errors::WebhookError;
use crate::domain::session::PurchaseSession;

/// Normalized customer identity, ready for directory reconciliation.
///
/// `email` is guaranteed non-empty; the other fields default to empty
/// strings rather than being absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Configured location of the structured last-name custom field.
#[derive(Debug, Clone)]
pub struct NameFieldMatcher {
    /// Field key to match (the original checkout form keys it "firstname").
    pub key: String,

    /// Custom field label to match.
    pub label: String,
}

impl NameFieldMatcher {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    /// Find the last-name value among the session's custom fields.
    fn last_name_in(&self, session: &PurchaseSession) -> Option<String> {
        session
            .custom_fields
            .iter()
            .find(|field| field.key == self.key || field.label.as_deref() == Some(&self.label))
            .and_then(|field| field.value.clone())
            .filter(|value| !value.is_empty())
    }
}

/// Extract a [`CustomerIdentity`] from a purchase session.
///
/// Email resolution: session-level email first, then the nested customer
/// details email; the first non-empty value wins. A session without any
/// email fails with [`WebhookError::MissingEmail`] and must not reach the
/// directory.
pub fn extract_identity(
    session: &PurchaseSession,
    name_field: &NameFieldMatcher,
) -> Result<CustomerIdentity, WebhookError> {
    let email = [&session.customer_email, &session.details_email]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
        .cloned()
        .ok_or(WebhookError::MissingEmail)?;

    let display_name = session.display_name.as_deref().unwrap_or("");

    let (first_name, last_name) = match name_field.last_name_in(session) {
        // Structured field present: display name is the first name verbatim.
        Some(last) => (display_name.to_string(), last),
        None => split_display_name(display_name),
    };

    Ok(CustomerIdentity {
        email,
        first_name,
        last_name,
        phone: session.phone.clone().unwrap_or_default(),
    })
}

/// Split a free-text display name into (first, last).
///
/// The first whitespace-separated token becomes the first name; the rest,
/// joined by single spaces, becomes the last name. An empty name yields two
/// empty strings.
fn split_display_name(name: &str) -> (String, String) {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or("").to_string();
    let rest: Vec<&str> = tokens.collect();
    (first, rest.join(" "))
}
