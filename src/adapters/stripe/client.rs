//! Processor API client for the line-items lookup.
//!
//! Implements the [`SessionLookup`] port with a "retrieve session with
//! expanded line items" call. Retry policy lives with the caller; this
//! client makes exactly one attempt per invocation.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::LineItem;
use crate::ports::{LookupError, SessionLookup};

use super::events::StripeLineItemList;

/// Processor API configuration.
#[derive(Clone)]
pub struct StripeClientConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the processor API.
    api_base_url: String,
}

impl StripeClientConfig {
    /// Create a new configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Processor API client.
pub struct StripeClient {
    config: StripeClientConfig,
    http_client: reqwest::Client,
}

impl StripeClient {
    /// Create a new client with the given configuration.
    pub fn new(config: StripeClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SessionLookup for StripeClient {
    async fn line_items(&self, session_id: &str) -> Result<Vec<LineItem>, LookupError> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .http_client
            .get(&url)
            .query(&[("expand[]", "line_items")])
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), error = %body, "Session retrieve failed");
            return Err(LookupError::Api {
                status: status.as_u16(),
                body,
            });
        }

        #[derive(serde::Deserialize)]
        struct SessionWithItems {
            #[serde(default)]
            line_items: StripeLineItemList,
        }

        let session: SessionWithItems = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        Ok(session.line_items.into_domain())
    }
}
