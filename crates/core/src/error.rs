//! Error types for android-sdk-client
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type shared across the workspace
#[derive(Error, Debug)]
pub enum SdkClientError {
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid manifest structure: {0}")]
    InvalidStructure(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Export error: {0}")]
    Export(String),
}

/// Result type alias for android-sdk-client operations
pub type Result<T> = std::result::Result<T, SdkClientError>;

impl SdkClientError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            SdkClientError::Network(msg) => {
                format!("Network error: {}. Please check your connection.", msg)
            }
            SdkClientError::XmlParse(msg) => format!("Manifest is not valid XML: {}", msg),
            SdkClientError::InvalidStructure(msg) => format!("Unexpected manifest layout: {}", msg),
            SdkClientError::Export(msg) => format!("Could not save manifest: {}", msg),
            _ => self.to_string(),
        }
    }
}
