//! Run Configuration
//!
//! Settings for a single listing run:
//! - Display options (extended listing, obsolete records)
//! - Export of raw and parsed manifests
//! - Root manifest locations
//!
//! The configuration is built once from the command line and passed by
//! reference to every component; nothing mutates it afterwards.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SdkClientError};

/// SDK repository manifest
pub const REPOSITORY_URL: &str = "https://dl.google.com/android/repository/repository-11.xml";

/// Add-ons list manifest, which points at the add-on and system image sites
pub const ADDONS_LIST_URL: &str = "https://dl.google.com/android/repository/addons_list-2.xml";

/// Listing output configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Print a detailed block with archives for every record
    pub extended: bool,
    /// Include records marked obsolete
    pub show_obsolete: bool,
}

/// Manifest export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    /// Write fetched manifests to disk
    pub enabled: bool,
    /// Root directory for exported files
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from("export"),
        }
    }
}

/// Root manifest locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// URL of the SDK repository manifest
    pub repository_url: String,
    /// URL of the add-ons list manifest
    pub addons_list_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repository_url: REPOSITORY_URL.to_string(),
            addons_list_url: ADDONS_LIST_URL.to_string(),
        }
    }
}

/// Complete configuration for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// How records are listed
    pub display: DisplayOptions,
    /// Where fetched manifests are saved
    pub export: ExportConfig,
    /// Which root manifests are fetched
    pub sources: SourceConfig,
}

impl ClientConfig {
    /// Build a configuration from the three command-line switches
    pub fn from_flags(extended: bool, show_obsolete: bool, save: bool) -> Self {
        let config = Self {
            display: DisplayOptions {
                extended,
                show_obsolete,
            },
            export: ExportConfig {
                enabled: save,
                ..Default::default()
            },
            sources: SourceConfig::default(),
        };
        debug!("Client configuration: {:?}", config);
        config
    }

    /// Check that both root manifest locations are absolute URLs
    pub fn validate(&self) -> Result<()> {
        for location in [&self.sources.repository_url, &self.sources.addons_list_url] {
            url::Url::parse(location).map_err(|e| {
                SdkClientError::Config(format!("invalid manifest URL {}: {}", location, e))
            })?;
        }
        Ok(())
    }
}
