//! REST client for the catalog's v1 API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use super::error::{CatalogError, CatalogResult};
use super::types::{ApiResponse, RemoteFile, RemoteProject};
use super::{BoxFuture, CatalogClient};

/// Default catalog API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.curseforge.com";

/// Default number of lookups in flight at once.
pub const DEFAULT_CATALOG_CONCURRENCY: usize = 16;

/// Default lookup timeout in seconds.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;

/// Settings for [`CurseForgeClient`].
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// API base URL, without trailing slash.
    pub api_base: String,
    /// API key sent as `x-api-key`.
    pub api_key: Option<String>,
    /// Maximum lookups in flight.
    pub concurrency: usize,
    /// Per-request timeout.
    pub lookup_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            concurrency: DEFAULT_CATALOG_CONCURRENCY,
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }
}

impl CatalogConfig {
    /// Set the API base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    /// Set the maximum number of concurrent lookups.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the per-request timeout.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }
}

/// Catalog client backed by `reqwest`.
///
/// Every request holds a permit from an internal semaphore, so callers may
/// fan out freely without exceeding `concurrency` requests on the wire.
#[derive(Debug, Clone)]
pub struct CurseForgeClient {
    client: Client,
    api_base: String,
    semaphore: Arc<Semaphore>,
}

impl CurseForgeClient {
    /// Build a client from its settings.
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref key) = config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| CatalogError::Config(format!("API key is not a valid header: {}", e)))?;
            headers.insert("x-api-key", value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.lookup_timeout)
            .build()
            .map_err(|e| CatalogError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
        })
    }

    /// API base URL this client talks to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// GET `path` and unwrap the `data` envelope.
    async fn get_data<T: DeserializeOwned>(&self, path: &str, what: String) -> CatalogResult<T> {
        let url = format!("{}{}", self.api_base, path);

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| CatalogError::Request {
                url: url.clone(),
                reason: "client semaphore closed".to_string(),
            })?;

        debug!(url = %url, "Catalog lookup");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::from_reqwest(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound { what });
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| CatalogError::from_reqwest(&url, e))?;
        Ok(body.data)
    }
}

impl CatalogClient for CurseForgeClient {
    fn lookup_project(&self, project_id: u32) -> BoxFuture<'_, CatalogResult<RemoteProject>> {
        Box::pin(async move {
            self.get_data(
                &format!("/v1/mods/{}", project_id),
                format!("project {}", project_id),
            )
            .await
        })
    }

    fn lookup_file(
        &self,
        project_id: u32,
        file_id: u32,
    ) -> BoxFuture<'_, CatalogResult<RemoteFile>> {
        Box::pin(async move {
            self.get_data(
                &format!("/v1/mods/{}/files/{}", project_id, file_id),
                format!("file {} of project {}", file_id, project_id),
            )
            .await
        })
    }

    fn resolve_download_url(
        &self,
        project_id: u32,
        file_id: u32,
    ) -> BoxFuture<'_, CatalogResult<Option<String>>> {
        Box::pin(async move {
            let url: Option<String> = self
                .get_data(
                    &format!("/v1/mods/{}/files/{}/download-url", project_id, file_id),
                    format!("download URL for file {} of project {}", file_id, project_id),
                )
                .await?;
            Ok(url.filter(|u| !u.is_empty()))
        })
    }
}
