//! HTTP file fetcher backed by `reqwest`.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{FetchError, FileFetcher};
use crate::catalog::BoxFuture;

/// Streams downloads with one overall timeout per transfer.
///
/// Redirects are followed with reqwest's default policy; CDN links from the
/// catalog usually redirect at least once.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher whose transfers time out after `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn stream_to(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| FetchError::io(dest, e))?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::from_reqwest(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::io(dest, e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| FetchError::io(dest, e))?;
        debug!(url = %url, path = %dest.display(), bytes = written, "Download complete");
        Ok(written)
    }
}

impl FileFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str, dest: &'a Path) -> BoxFuture<'a, Result<u64, FetchError>> {
        Box::pin(self.stream_to(url, dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CannedResponse, TestServer};
    use tempfile::TempDir;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_streams_body_to_file() {
        let body = vec![7u8; 100_000];
        let server = TestServer::start(vec![(
            "/files/1/2/a.jar".to_string(),
            CannedResponse::bytes(200, &body),
        )])
        .await;
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a.jar");

        let written = fetcher()
            .fetch(&server.url("/files/1/2/a.jar"), &dest)
            .await
            .unwrap();

        assert_eq!(written, 100_000);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn test_follows_redirect() {
        let server = TestServer::start(vec![(
            "/real.jar".to_string(),
            CannedResponse::bytes(200, b"jar bytes"),
        )])
        .await;
        let redirector = TestServer::start(vec![(
            "/link".to_string(),
            CannedResponse::redirect(&server.url("/real.jar")),
        )])
        .await;
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("real.jar");

        fetcher()
            .fetch(&redirector.url("/link"), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"jar bytes");
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = TestServer::start(vec![]).await;
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing.jar");

        let err = fetcher()
            .fetch(&server.url("/missing.jar"), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_truncated_body_is_error() {
        let server = TestServer::start(vec![(
            "/short.jar".to_string(),
            CannedResponse::truncated(b"only part"),
        )])
        .await;
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("short.jar");

        let err = fetcher()
            .fetch(&server.url("/short.jar"), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Request { .. }));
    }
}
