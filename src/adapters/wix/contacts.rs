//! Contact directory adapter (Wix Contacts v4 API).
//!
//! Implements the [`ContactDirectory`] port over three REST calls:
//! query-by-email, create, and patch. Authentication is a bearer credential
//! plus a site identifier, both injected as request headers on every call.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::ports::{
    ContactDirectory, ContactDraft, ContactPatch, DirectoryContact, DirectoryError,
};

use super::types::{ContactResponse, QueryContactsResponse, WixContactInfo};

/// Error code the directory returns when a create collides with an
/// existing contact.
const DUPLICATE_CONTACT_CODE: &str = "DUPLICATE_CONTACT_EXISTS";

/// Directory API configuration.
#[derive(Clone)]
pub struct WixDirectoryConfig {
    /// API bearer credential.
    api_key: SecretString,

    /// Site identifier sent as the `wix-site-id` header.
    site_id: String,

    /// Base URL for the directory API.
    base_url: String,
}

impl WixDirectoryConfig {
    /// Create a new configuration.
    pub fn new(api_key: impl Into<String>, site_id: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            site_id: site_id.into(),
            base_url: "https://www.wixapis.com".to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Contact directory adapter.
pub struct WixContactsDirectory {
    config: WixDirectoryConfig,
    http_client: reqwest::Client,
}

impl WixContactsDirectory {
    /// Create a new adapter with the given configuration.
    pub fn new(config: WixDirectoryConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/contacts/v4/contacts{}", self.config.base_url, path)
    }

    /// Apply the authentication headers every directory call requires.
    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(self.config.api_key.expose_secret())
            .header("wix-site-id", &self.config.site_id)
    }

    async fn read_failure(response: reqwest::Response) -> DirectoryError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status, error = %body, "Directory call failed");
        DirectoryError::Api { status, body }
    }
}

#[async_trait]
impl ContactDirectory for WixContactsDirectory {
    async fn search_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<DirectoryContact>, DirectoryError> {
        let request_body = json!({
            "query": {
                "filter": { "info.emails.email": { "$eq": email } }
            }
        });

        let response = self
            .authed(self.http_client.post(self.endpoint("/query")))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_failure(response).await);
        }

        let result: QueryContactsResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Parse(e.to_string()))?;

        Ok(result.contacts.into_iter().map(Into::into).collect())
    }

    async fn create(&self, draft: &ContactDraft) -> Result<DirectoryContact, DirectoryError> {
        let request_body = json!({ "info": WixContactInfo::from_draft(draft) });

        let response = self
            .authed(self.http_client.post(self.endpoint("")))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 409 || body.contains(DUPLICATE_CONTACT_CODE) {
                return Err(DirectoryError::DuplicateContact(draft.email.clone()));
            }
            tracing::error!(status = status.as_u16(), error = %body, "Contact create failed");
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: ContactResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Parse(e.to_string()))?;

        Ok(result.contact.into())
    }

    async fn patch(
        &self,
        contact_id: &str,
        patch: &ContactPatch,
    ) -> Result<DirectoryContact, DirectoryError> {
        let request_body = json!({ "info": WixContactInfo::from_patch(patch) });

        let response = self
            .authed(
                self.http_client
                    .patch(self.endpoint(&format!("/{}", contact_id))),
            )
            .json(&request_body)
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_failure(response).await);
        }

        let result: ContactResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Parse(e.to_string()))?;

        Ok(result.contact.into())
    }
}
