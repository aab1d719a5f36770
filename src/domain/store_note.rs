use std::fmt::Write;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::domain::lenient;

/// Operator-owned annotation on an order, edited in the sheet and pushed back
/// to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreNote {
    #[serde(deserialize_with = "lenient::text")]
    pub note: String,
    #[serde(deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(deserialize_with = "lenient::text")]
    pub erply_invoice_ids: String,
}

impl StoreNote {
    pub fn new(
        status: impl Into<String>,
        note: impl Into<String>,
        erply_invoice_ids: impl Into<String>,
    ) -> Self {
        Self {
            note: note.into(),
            status: status.into(),
            erply_invoice_ids: erply_invoice_ids.into(),
        }
    }

    /// Fingerprint of the mutable fields, used to spot edits between runs.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.status, &self.note, &self.erply_invoice_ids)
    }

    pub fn is_blank(&self) -> bool {
        self.note.is_empty() && self.status.is_empty() && self.erply_invoice_ids.is_empty()
    }
}

/// Lowercase hex MD5 over `status + note + invoice_ids`, in that order.
///
/// Sheets written by earlier deployments carry MD5 fingerprints, so the
/// digest and the concatenation order must not change.
pub fn fingerprint(status: &str, note: &str, erply_invoice_ids: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(status.as_bytes());
    hasher.update(note.as_bytes());
    hasher.update(erply_invoice_ids.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        // Writing to a String cannot fail.
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}
