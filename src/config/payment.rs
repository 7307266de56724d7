//! Payment processor configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment processor configuration (webhook verification + eligibility targets)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Webhook signing secret (whsec_...)
    pub webhook_secret: String,

    /// Processor API key (sk_...), used for the line-items lookup
    #[serde(default)]
    pub api_key: String,

    /// Metadata key holding the short label code
    #[serde(default = "default_label_key")]
    pub label_key: String,

    /// Exact label code marking a tracked purchase (e.g. "RT2025")
    #[serde(default)]
    pub label_code: Option<String>,

    /// Metadata key holding the long-form label
    #[serde(default = "default_label_phrase_key")]
    pub label_phrase_key: String,

    /// Phrase matched as a substring of the long-form label
    #[serde(default)]
    pub label_phrase: Option<String>,

    /// Product identifier of the tracked product
    #[serde(default)]
    pub target_product_id: Option<String>,

    /// Price identifier of the tracked product
    #[serde(default)]
    pub target_price_id: Option<String>,
}

fn default_label_key() -> String {
    "Label".to_string()
}

fn default_label_phrase_key() -> String {
    "Wix Label".to_string()
}

impl PaymentConfig {
    /// Check if using processor test mode
    pub fn is_test_mode(&self) -> bool {
        self.api_key.starts_with("sk_test_")
    }

    /// True when a product or price target is configured, enabling the
    /// line-items eligibility check and its processor lookup.
    pub fn has_item_targets(&self) -> bool {
        self.target_product_id.is_some() || self.target_price_id.is_some()
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        if !self.webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }

        // The API key is only exercised by the line-items lookup, but when
        // present it must carry a secret-key prefix.
        if !self.api_key.is_empty() && !self.api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidPaymentKey);
        }
        if self.has_item_targets() && self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__API_KEY"));
        }

        if self.label_code.is_none()
            && self.label_phrase.is_none()
            && !self.has_item_targets()
        {
            return Err(ValidationError::NoEligibilityTarget);
        }

        Ok(())
    }
}
