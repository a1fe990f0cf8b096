//! File download stage.
//!
//! - [`FileFetcher`]: streams one URL to one path
//! - [`HttpFetcher`]: the reqwest implementation
//! - [`RetryPolicy`]: attempt cap and exponential backoff
//! - `stage`: fans targets out over the task pool, with `.part` staging

mod http;
mod retry;
mod stage;
mod verify;

pub use http::HttpFetcher;
pub use retry::RetryPolicy;
pub(crate) use stage::{download_all, DownloadJob, DownloadOptions};

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::BoxFuture;

/// Errors from a single download attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The transfer exceeded the download timeout.
    #[error("download of {url} timed out")]
    Timeout { url: String },

    /// Connecting or streaming failed.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// Writing the local file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Streams a URL to a local file.
///
/// Implementations write to exactly `dest`, creating or truncating it, and
/// return the number of bytes written. They do not retry; the download stage
/// owns retries and cleanup.
pub trait FileFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str, dest: &'a Path) -> BoxFuture<'a, Result<u64, FetchError>>;
}

impl<F: FileFetcher + ?Sized> FileFetcher for std::sync::Arc<F> {
    fn fetch<'a>(&'a self, url: &'a str, dest: &'a Path) -> BoxFuture<'a, Result<u64, FetchError>> {
        (**self).fetch(url, dest)
    }
}
