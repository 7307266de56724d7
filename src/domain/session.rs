//! Domain view of a completed checkout session.
//!
//! All eligibility and identity decisions operate on this one shape so the
//! payload parsing lives in a single place (the processor adapter) rather
//! than being repeated per matching strategy.

use std::collections::HashMap;

/// A purchase session extracted from a verified checkout-completed event.
#[derive(Debug, Clone, Default)]
pub struct PurchaseSession {
    /// Processor session identifier (cs_...). Unique per event.
    pub id: String,

    /// Email captured at the session level, if any.
    pub customer_email: Option<String>,

    /// Email from the nested customer details, if any.
    pub details_email: Option<String>,

    /// Free-text display name from customer details.
    pub display_name: Option<String>,

    /// Phone from customer details.
    pub phone: Option<String>,

    /// Total amount in minor currency units (cents).
    pub amount_total: Option<i64>,

    /// Session metadata as configured on the payment link / checkout.
    pub metadata: HashMap<String, String>,

    /// Custom form fields collected during checkout.
    pub custom_fields: Vec<CustomField>,

    /// Purchased line items, when present in the payload. `None` means the
    /// payload did not carry them and a processor lookup is required.
    pub line_items: Option<Vec<LineItem>>,
}

impl PurchaseSession {
    /// Total amount converted to major currency units.
    pub fn amount_major_units(&self) -> Option<f64> {
        self.amount_total.map(|cents| cents as f64 / 100.0)
    }
}

/// A custom checkout form field.
#[derive(Debug, Clone, Default)]
pub struct CustomField {
    /// Machine key of the field.
    pub key: String,

    /// Human label shown on the form, if customized.
    pub label: Option<String>,

    /// Text value entered by the customer.
    pub value: Option<String>,
}

/// A purchased line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Product identifier (prod_...).
    pub product_id: Option<String>,

    /// Price identifier (price_...).
    pub price_id: Option<String>,
}
