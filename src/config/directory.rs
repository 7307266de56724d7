//! Contact directory configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Contact directory configuration (Wix Contacts API)
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Directory API bearer credential
    pub api_key: String,

    /// Site identifier sent with every directory request
    pub site_id: String,

    /// Base URL for the directory API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Marketing label applied to purchasers of the tracked product
    pub target_label: String,

    /// Checkout custom-field key carrying the last name
    #[serde(default = "default_last_name_field_key")]
    pub last_name_field_key: String,

    /// Checkout custom-field label carrying the last name
    #[serde(default = "default_last_name_field_label")]
    pub last_name_field_label: String,
}

fn default_base_url() -> String {
    "https://www.wixapis.com".to_string()
}

// The original checkout form stores the last name under a field keyed
// "firstname"; the label is the reliable signal when forms are rebuilt.
fn default_last_name_field_key() -> String {
    "firstname".to_string()
}

fn default_last_name_field_label() -> String {
    "Last name".to_string()
}

impl DirectoryConfig {
    /// Validate directory configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("DIRECTORY__API_KEY"));
        }
        if self.site_id.is_empty() {
            return Err(ValidationError::MissingRequired("DIRECTORY__SITE_ID"));
        }
        if self.target_label.is_empty() {
            return Err(ValidationError::MissingRequired("DIRECTORY__TARGET_LABEL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidDirectoryUrl);
        }
        Ok(())
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            site_id: String::new(),
            base_url: default_base_url(),
            target_label: String::new(),
            last_name_field_key: default_last_name_field_key(),
            last_name_field_label: default_last_name_field_label(),
        }
    }
}
