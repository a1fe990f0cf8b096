//! packfetch - modpack installer for the CurseForge catalog
//!
//! The library reads a pack archive, resolves every listed file against the
//! catalog, and downloads the files into a game directory with bounded
//! concurrency and retry.
//!
//! - [`fingerprint`]: whitespace-normalized MurmurHash2 used to identify files
//! - [`cdn`]: CDN URL derivation when the catalog omits a download URL
//! - [`catalog`]: the catalog lookup trait and its REST client
//! - [`manifest`]: the pack manifest model
//! - [`installer`]: archive parsing and the resolve/classify/download pipeline
//! - [`config`], [`logging`]: ambient setup used by the CLI

pub mod catalog;
pub mod cdn;
pub mod config;
pub mod fingerprint;
pub mod installer;
pub mod logging;
pub mod manifest;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{CatalogClient, CatalogConfig, CurseForgeClient};
pub use installer::{InstallReport, InstallerConfig, ModpackInstaller};
pub use manifest::{Manifest, ManifestEntry};
