//! android-sdk-client
//!
//! Lists the Android SDK components published in Google's repository
//! manifests: platforms, tools, add-ons and system images.
//!
//! ## Architecture
//!
//! - `sdk-client-core`: run configuration and shared errors
//! - `sdk-client-manifest`: manifest parsing and record formatting
//! - `sdk-client-repository`: fetching, export and the listing run

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;

pub use sdk_client_core as core;
pub use sdk_client_manifest as manifest;
pub use sdk_client_repository as repository;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
