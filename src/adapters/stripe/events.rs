//! Processor wire types for webhook payloads.
//!
//! These types represent the event envelope and checkout session exactly as
//! they arrive on the wire, and convert into the domain view the pipeline
//! operates on.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::{CustomField, LineItem, PurchaseSession};

/// Raw webhook event envelope as received from the processor.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    #[serde(default)]
    pub created: i64,

    /// Event payload containing the affected object.
    pub data: StripeEventData,

    /// Whether this is a live or test event.
    #[serde(default)]
    pub livemode: bool,
}

/// Event data container.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    /// The object affected by this event.
    pub object: serde_json::Value,
}

/// Checkout session object as carried in a checkout-completed event.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Customer email used during checkout.
    pub customer_email: Option<String>,

    /// Details collected from the customer during checkout.
    pub customer_details: Option<StripeCustomerDetails>,

    /// Total amount in minor currency units.
    pub amount_total: Option<i64>,

    /// Custom metadata attached to the session.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Custom form fields collected during checkout.
    #[serde(default)]
    pub custom_fields: Vec<StripeCustomField>,

    /// Line items, present only when the payload was expanded.
    pub line_items: Option<StripeLineItemList>,
}

/// Customer details nested in a checkout session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StripeCustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// A custom checkout form field.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomField {
    pub key: String,

    /// Field label; custom labels carry the display text.
    pub label: Option<StripeCustomFieldLabel>,

    /// Text value container.
    pub text: Option<StripeCustomFieldText>,
}

/// Custom field label container.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomFieldLabel {
    pub custom: Option<String>,
}

/// Custom field text container.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomFieldText {
    pub value: Option<String>,
}

/// Line item list container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StripeLineItemList {
    #[serde(default)]
    pub data: Vec<StripeLineItem>,
}

/// Single purchased line item.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeLineItem {
    pub price: Option<StripePrice>,
}

/// Price object embedded in line items.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    /// Price ID.
    pub id: String,

    /// Product ID this price is for.
    pub product: Option<String>,
}

impl StripeLineItem {
    fn into_domain(self) -> LineItem {
        match self.price {
            Some(price) => LineItem {
                price_id: Some(price.id),
                product_id: price.product,
            },
            None => LineItem {
                price_id: None,
                product_id: None,
            },
        }
    }
}

impl StripeLineItemList {
    /// Convert the wire list into domain line items.
    pub fn into_domain(self) -> Vec<LineItem> {
        self.data.into_iter().map(StripeLineItem::into_domain).collect()
    }
}

impl StripeCheckoutSession {
    /// Convert the wire session into the domain view.
    pub fn into_domain(self) -> PurchaseSession {
        let details = self.customer_details.unwrap_or_default();

        PurchaseSession {
            id: self.id,
            customer_email: self.customer_email,
            details_email: details.email,
            display_name: details.name,
            phone: details.phone,
            amount_total: self.amount_total,
            metadata: self.metadata,
            custom_fields: self
                .custom_fields
                .into_iter()
                .map(|field| CustomField {
                    key: field.key,
                    label: field.label.and_then(|label| label.custom),
                    value: field.text.and_then(|text| text.value),
                })
                .collect(),
            line_items: self.line_items.map(StripeLineItemList::into_domain),
        }
    }
}
