//! Eligibility rules for the tracked product.
//!
//! A session is eligible when any strategy matches, tried in priority order:
//!
//! 1. Metadata label — exact code match, or substring match of a phrase.
//! 2. Metadata identifiers — product/price id equality in session metadata.
//! 3. Line items — product/price id equality against purchased items.
//!
//! Strategies 1 and 2 are pure functions over [`PurchaseSession`]. Strategy 3
//! may require a processor lookup, so it is exposed as a predicate over the
//! fetched items and sequenced by the orchestrator.

use crate::config::PaymentConfig;
use crate::domain::session::{LineItem, PurchaseSession};

/// Configured signals that mark a purchase as the tracked product.
#[derive(Debug, Clone, Default)]
pub struct EligibilityTargets {
    /// Metadata key for the short label code.
    pub label_key: String,

    /// Exact label code (e.g. "RT2025").
    pub label_code: Option<String>,

    /// Metadata key for the long-form label.
    pub label_phrase_key: String,

    /// Substring matched inside the long-form label.
    pub label_phrase: Option<String>,

    /// Tracked product identifier.
    pub product_id: Option<String>,

    /// Tracked price identifier.
    pub price_id: Option<String>,
}

/// Which strategy matched an eligible session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    /// Exact label-code metadata match.
    LabelCode,

    /// Substring label-phrase metadata match.
    LabelPhrase,

    /// Product/price id found in session metadata.
    MetadataItemId,

    /// Product/price id found in purchased line items.
    LineItem,
}

impl EligibilityTargets {
    /// Build targets from the payment configuration section.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            label_key: config.label_key.clone(),
            label_code: config.label_code.clone(),
            label_phrase_key: config.label_phrase_key.clone(),
            label_phrase: config.label_phrase.clone(),
            product_id: config.target_product_id.clone(),
            price_id: config.target_price_id.clone(),
        }
    }

    /// Try the metadata strategies (1 and 2) in priority order.
    ///
    /// Returns the first matching reason, or `None` when neither metadata
    /// strategy fires. This never touches the network.
    pub fn metadata_match(&self, session: &PurchaseSession) -> Option<MatchReason> {
        if let Some(code) = &self.label_code {
            if session.metadata.get(&self.label_key) == Some(code) {
                return Some(MatchReason::LabelCode);
            }
        }

        if let Some(phrase) = &self.label_phrase {
            if let Some(value) = session.metadata.get(&self.label_phrase_key) {
                if value.contains(phrase.as_str()) {
                    return Some(MatchReason::LabelPhrase);
                }
            }
        }

        if self.metadata_item_match(session) {
            return Some(MatchReason::MetadataItemId);
        }

        None
    }

    /// Strategy 2: product/price id equality against top-level metadata.
    fn metadata_item_match(&self, session: &PurchaseSession) -> bool {
        let product_hit = self
            .product_id
            .as_ref()
            .is_some_and(|id| session.metadata.get("product_id") == Some(id));
        let price_hit = self
            .price_id
            .as_ref()
            .is_some_and(|id| session.metadata.get("price_id") == Some(id));

        product_hit || price_hit
    }

    /// Strategy 3 predicate: does any purchased item carry a target id?
    pub fn items_match(&self, items: &[LineItem]) -> bool {
        items.iter().any(|item| {
            let product_hit = self
                .product_id
                .as_ref()
                .is_some_and(|id| item.product_id.as_ref() == Some(id));
            let price_hit = self
                .price_id
                .as_ref()
                .is_some_and(|id| item.price_id.as_ref() == Some(id));
            product_hit || price_hit
        })
    }

    /// True when strategy 3 is worth running at all.
    pub fn has_item_targets(&self) -> bool {
        self.product_id.is_some() || self.price_id.is_some()
    }
}
