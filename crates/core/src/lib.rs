//! android-sdk-client core - configuration and shared types
//!
//! Holds the immutable run configuration built from the command line and
//! the error type shared by the manifest and repository crates.


pub mod config;
pub mod error;

pub use config::{ClientConfig, DisplayOptions, ExportConfig, SourceConfig};
pub use error::{Result, SdkClientError};
