//! Manifest Fetcher
//!
//! Retrieves manifest documents over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// A fetched document and its response metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Final URL after any redirects followed by the client
    pub response_url: String,
}

/// Fetch error types
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}

impl From<FetchError> for sdk_client_core::SdkClientError {
    fn from(err: FetchError) -> Self {
        sdk_client_core::SdkClientError::Network(err.to_string())
    }
}

/// Source of manifest documents
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// Issue one GET for `url`. Non-success statuses are errors.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// HTTP fetcher backed by reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the client's default redirect and timeout policy
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ManifestFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let response_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response_url,
            });
        }

        let body = response.bytes().await?.to_vec();
        debug!("Fetched {} bytes from {}", body.len(), response_url);

        Ok(FetchResponse {
            status: status.as_u16(),
            body,
            response_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/android/repository/repository-11.xml")
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body("<sdk:sdk-repository/>")
            .create_async()
            .await;

        let url = format!("{}/android/repository/repository-11.xml", server.url());
        let fetcher = HttpFetcher::new().unwrap();
        let response = fetcher.fetch(&url).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"<sdk:sdk-repository/>".to_vec());
        assert_eq!(response.response_url, url);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.xml")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/missing.xml", server.url());
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[test]
    fn test_status_error_message() {
        let err = sdk_client_core::SdkClientError::from(FetchError::Status {
            status: 503,
            url: "https://repo.test/addon.xml".to_string(),
        });
        assert_eq!(
            err.user_message(),
            "Network error: HTTP 503 from https://repo.test/addon.xml. Please check your connection."
        );
    }
}
