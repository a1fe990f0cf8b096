//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`install`] - Install a modpack archive into a directory
//! - [`info`] - Show what an archive's manifest contains
//! - [`fingerprint`] - Print catalog fingerprints of local files
//! - [`latest`] - Show the newest archive of a pack project
//! - [`download`] - Download the newest archive of a pack project

pub mod common;
pub mod download;
pub mod fingerprint;
pub mod info;
pub mod install;
pub mod latest;
