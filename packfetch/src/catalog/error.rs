//! Catalog lookup errors.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors from a single catalog lookup.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The catalog has no such project or file.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The catalog answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The request exceeded the lookup timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The response body was not the expected shape.
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The client could not be built from its configuration.
    #[error("invalid catalog client configuration: {0}")]
    Config(String),
}

impl CatalogError {
    /// Whether this error means the entity does not exist upstream.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            Self::Decode {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = CatalogError::NotFound {
            what: "file 1/2".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: file 1/2");

        let err = CatalogError::Status {
            status: 500,
            url: "https://api/v1/mods/1".into(),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("500"));
    }
}
