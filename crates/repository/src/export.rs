//! Manifest export
//!
//! Writes each fetched manifest under the export directory, mirroring the
//! path of its URL, next to a JSON dump of the parsed tree. Writes run as
//! detached tasks; a failed or unfinished write never affects the listing.

use std::path::PathBuf;

use sdk_client_core::SdkClientError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::source::ManifestSource;

/// Export error types
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("URL {0} does not name a file")]
    NoFileName(String),
    #[error("Source {0} has not been fetched and parsed")]
    NotParsed(String),
}

impl From<ExportError> for SdkClientError {
    fn from(err: ExportError) -> Self {
        SdkClientError::Export(err.to_string())
    }
}

/// Files written for one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub raw: PathBuf,
    pub json: PathBuf,
}

/// Export sink rooted at one directory
#[derive(Debug, Clone)]
pub struct ExportSink {
    directory: PathBuf,
}

impl ExportSink {
    /// Sink writing under `directory`, created on first write
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Target files for a manifest URL. The JSON copy replaces the extension.
    pub fn paths_for(&self, url: &str) -> Result<ExportPaths, ExportError> {
        let parsed = Url::parse(url)?;
        let mut raw = self.directory.clone();
        let mut named = false;
        for segment in parsed.path_segments().into_iter().flatten() {
            named = !segment.is_empty();
            if named && segment != "." && segment != ".." {
                raw.push(segment);
            }
        }
        if !named {
            return Err(ExportError::NoFileName(url.to_string()));
        }

        let json = raw.with_extension("json");
        Ok(ExportPaths { raw, json })
    }

    /// Write both files for a parsed source
    pub async fn write(&self, source: &ManifestSource) -> Result<ExportPaths, ExportError> {
        let (paths, body, json) = self.prepare(source)?;
        write_files(&paths, &body, &json).await?;
        Ok(paths)
    }

    /// Start writing both files in the background. Failures are logged.
    pub fn spawn(&self, source: &ManifestSource) -> Option<JoinHandle<()>> {
        let (paths, body, json) = match self.prepare(source) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(
                    "Skipping export of {}: {}",
                    source.url,
                    SdkClientError::from(e).user_message()
                );
                return None;
            }
        };

        Some(tokio::spawn(async move {
            if let Err(e) = write_files(&paths, &body, &json).await {
                warn!(
                    "Failed to export {:?}: {}",
                    paths.raw,
                    SdkClientError::from(e).user_message()
                );
            }
        }))
    }

    fn prepare(&self, source: &ManifestSource) -> Result<(ExportPaths, Vec<u8>, String), ExportError> {
        let (Some(body), Some(document)) = (&source.raw_body, &source.document) else {
            return Err(ExportError::NotParsed(source.url.clone()));
        };
        let paths = self.paths_for(&source.url)?;
        let json = document.to_json_pretty()?;
        Ok((paths, body.clone(), json))
    }
}

async fn write_files(paths: &ExportPaths, body: &[u8], json: &str) -> Result<(), ExportError> {
    if let Some(parent) = paths.raw.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&paths.raw, body).await?;
    tokio::fs::write(&paths.json, json).await?;
    debug!("Exported {:?} and {:?}", paths.raw, paths.json);
    Ok(())
}
