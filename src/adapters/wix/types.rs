//! Directory wire types (Wix Contacts v4 API).
//!
//! The API wraps every repeated field in an `{ "items": [...] }` container
//! and namespaces custom data under `labelKeys` / `extendedFields`. These
//! types model that shape and convert to and from the port types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ports::{ContactDraft, ContactPatch, DirectoryContact};

/// Contact as returned by the directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WixContact {
    pub id: String,
    pub info: WixContactInfo,
}

/// The mutable `info` section of a contact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WixContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<WixName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<WixItems<WixEmail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<WixItems<WixPhone>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_keys: Option<WixItems<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_fields: Option<WixExtendedFields>,
}

/// Generic `{ "items": [...] }` container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WixItems<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> WixItems<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// Structured contact name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WixName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Email list entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WixEmail {
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Phone list entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WixPhone {
    pub phone: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Extended fields container; values arrive as arbitrary JSON scalars.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WixExtendedFields {
    #[serde(default)]
    pub items: HashMap<String, serde_json::Value>,
}

/// Response envelope for contact query calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryContactsResponse {
    #[serde(default)]
    pub contacts: Vec<WixContact>,
}

/// Response envelope for create and patch calls.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactResponse {
    pub contact: WixContact,
}

impl From<WixContact> for DirectoryContact {
    fn from(contact: WixContact) -> Self {
        let info = contact.info;
        let name = info.name.unwrap_or_default();

        DirectoryContact {
            id: contact.id,
            emails: info
                .emails
                .map(|list| list.items.into_iter().map(|item| item.email).collect())
                .unwrap_or_default(),
            first_name: name.first.unwrap_or_default(),
            last_name: name.last.unwrap_or_default(),
            phones: info
                .phones
                .map(|list| list.items.into_iter().map(|item| item.phone).collect())
                .unwrap_or_default(),
            label_keys: info.label_keys.map(|list| list.items).unwrap_or_default(),
            extended_fields: info
                .extended_fields
                .map(|fields| {
                    fields
                        .items
                        .into_iter()
                        .map(|(key, value)| (key, scalar_to_string(value)))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn scalar_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

impl WixContactInfo {
    /// Build the `info` payload for a create call.
    ///
    /// The directory rejects contacts whose info is entirely empty; the
    /// draft always carries an email, so the constraint holds even when the
    /// phone is absent.
    pub fn from_draft(draft: &ContactDraft) -> Self {
        let name = WixName {
            first: Some(draft.first_name.clone()),
            last: Some(draft.last_name.clone()),
        };

        let phones = draft
            .phone
            .as_ref()
            .filter(|phone| !phone.is_empty())
            .map(|phone| {
                WixItems::new(vec![WixPhone {
                    phone: phone.clone(),
                    tag: Some("MOBILE".to_string()),
                }])
            });

        Self {
            name: Some(name),
            emails: Some(WixItems::new(vec![WixEmail {
                email: draft.email.clone(),
                tag: Some("MAIN".to_string()),
            }])),
            phones,
            label_keys: Some(WixItems::new(vec![draft.label_key.clone()])),
            extended_fields: Some(WixExtendedFields {
                items: draft
                    .extended_fields
                    .iter()
                    .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
                    .collect(),
            }),
        }
    }

    /// Build the `info` payload for a patch call: labels and extended
    /// fields only, leaving every other contact field untouched.
    pub fn from_patch(patch: &ContactPatch) -> Self {
        Self {
            label_keys: Some(WixItems::new(patch.label_keys.clone())),
            extended_fields: Some(WixExtendedFields {
                items: patch
                    .extended_fields
                    .iter()
                    .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
                    .collect(),
            }),
            ..Default::default()
        }
    }
}
