//! Android SDK repository access
//!
//! Handles fetching of the published manifests, discovery of add-on and
//! system image sites, export of fetched documents, and the listing run
//! that ties them together.

pub mod source;
pub mod fetcher;
pub mod export;
pub mod orchestrator;

pub use source::ManifestSource;
pub use fetcher::{FetchError, FetchResponse, HttpFetcher, ManifestFetcher};
pub use export::{ExportError, ExportPaths, ExportSink};
pub use orchestrator::{discover, OutputCallback, RepositoryOrchestrator, DONE_MESSAGE};
