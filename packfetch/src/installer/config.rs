//! Configuration for the modpack installer.

use std::time::Duration;

use crate::cdn::DEFAULT_CDN_BASE;

/// Default number of network operations in flight per stage.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Default number of download attempts per file (including the first).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff unit; the wait after attempt `n` is `unit * 2^n`.
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Default timeout for one streamed download in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Default name of the resolved manifest written to the install root.
pub const DEFAULT_MANIFEST_FILE_NAME: &str = "manifest.json";

/// Configuration for [`ModpackInstaller`](super::ModpackInstaller).
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Ceiling on simultaneous operations within each stage.
    pub concurrency: usize,

    /// Download attempts per file, including the first.
    pub max_retries: u32,

    /// Base unit for exponential backoff between download attempts.
    pub backoff_unit: Duration,

    /// Timeout for a single streamed download.
    pub download_timeout: Duration,

    /// Whether pre-existing files are checked against the catalog fingerprint.
    ///
    /// Only applies to entries resolved in this run; entries that arrive
    /// pre-resolved carry no fingerprint and are trusted if present.
    pub verify_existing: bool,

    /// CDN base used when the catalog supplies no download URL.
    pub cdn_base: String,

    /// File name of the resolved manifest in the install root.
    pub manifest_file_name: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            verify_existing: true,
            cdn_base: DEFAULT_CDN_BASE.to_string(),
            manifest_file_name: DEFAULT_MANIFEST_FILE_NAME.to_string(),
        }
    }
}

impl InstallerConfig {
    /// Set the per-stage concurrency ceiling (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the number of download attempts (at least 1).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the backoff unit.
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Set the download timeout.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Enable or disable fingerprint verification of existing files.
    pub fn with_verify_existing(mut self, verify: bool) -> Self {
        self.verify_existing = verify;
        self
    }

    /// Set the CDN base URL.
    pub fn with_cdn_base(mut self, base: impl Into<String>) -> Self {
        self.cdn_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the resolved manifest file name.
    pub fn with_manifest_file_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_file_name = name.into();
        self
    }
}
