//! Manifest sources

use sdk_client_manifest::ManifestDocument;

/// One manifest to fetch, and what was fetched for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSource {
    pub url: String,
    pub name: String,
    /// Response body as received
    pub raw_body: Option<Vec<u8>>,
    /// Parsed tree; `None` until fetched, and after a fetch or parse failure
    pub document: Option<ManifestDocument>,
}

impl ManifestSource {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            raw_body: None,
            document: None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.document.is_some()
    }
}
