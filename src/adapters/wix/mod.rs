//! Contact directory adapter (Wix Contacts API).

mod contacts;
mod types;

pub use contacts::{WixContactsDirectory, WixDirectoryConfig};
pub use types::{WixContact, WixContactInfo};
