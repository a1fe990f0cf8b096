//! Modpack installation.
//!
//! [`ModpackInstaller`] turns a pack archive into a populated game directory:
//! overrides are copied out of the archive, every manifest entry is resolved
//! against the catalog, project classes pick the destination folder, files
//! are downloaded with retry, and the resolved manifest is written back.
//!
//! Each network stage fans out through a [`TaskPool`] bounded by
//! [`InstallerConfig::concurrency`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use packfetch::catalog::{CatalogConfig, CurseForgeClient};
//! use packfetch::installer::{InstallerConfig, ModpackInstaller};
//!
//! let catalog = CurseForgeClient::new(CatalogConfig::default().with_api_key(key))?;
//! let installer = ModpackInstaller::new(Arc::new(catalog), InstallerConfig::default())?;
//! let report = installer.install("pack.zip", "./minecraft").await?;
//! println!("{} downloaded, {} failed", report.downloaded(), report.failed());
//! ```

mod archive;
mod classify;
mod config;
mod download;
mod error;
mod observer;
mod pack;
mod pipeline;
mod pool;
mod report;
mod resolve;

pub use archive::PackArchive;
pub use classify::DownloadTarget;
pub use config::{
    InstallerConfig, DEFAULT_BACKOFF_UNIT, DEFAULT_CONCURRENCY, DEFAULT_DOWNLOAD_TIMEOUT_SECS,
    DEFAULT_MANIFEST_FILE_NAME, DEFAULT_MAX_RETRIES,
};
pub use download::{FetchError, FileFetcher, HttpFetcher, RetryPolicy};
pub use error::{InstallError, InstallResult};
pub use observer::{InstallObserver, InstallStage, NoopObserver};
pub use pack::{select_latest_file, PackDownload};
pub use pipeline::{inspect, ModpackInstaller};
pub use pool::TaskPool;
pub use report::{EntryOutcome, EntryReport, InstallReport};
