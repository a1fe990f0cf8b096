//! Picking and fetching a modpack's own archive.

use std::path::PathBuf;

use crate::catalog::{RemoteFile, RemoteProject};

/// Pick the file to download from a project's `latestFiles`.
///
/// Server packs and files without a name are never chosen. With a
/// `game_version`, files listing that version are preferred; when none do,
/// the filter is dropped rather than returning nothing. Among the remaining
/// files the newest release date wins, files without a date rank oldest,
/// and ties keep catalog order.
pub fn select_latest_file<'a>(
    project: &'a RemoteProject,
    game_version: Option<&str>,
) -> Option<&'a RemoteFile> {
    let candidates: Vec<&RemoteFile> = project
        .latest_files
        .iter()
        .filter(|f| !f.is_server_pack && !f.file_name.is_empty())
        .collect();

    let matching: Vec<&RemoteFile> = match game_version.filter(|v| !v.is_empty()) {
        Some(version) => candidates
            .iter()
            .copied()
            .filter(|f| f.game_versions.iter().any(|v| v == version))
            .collect(),
        None => Vec::new(),
    };
    let pool = if matching.is_empty() {
        candidates
    } else {
        matching
    };

    let mut newest: Option<&RemoteFile> = None;
    for file in pool {
        if newest.map_or(true, |best| file.release_date > best.release_date) {
            newest = Some(file);
        }
    }
    newest
}

/// Result of [`ModpackInstaller::download_pack`](super::ModpackInstaller::download_pack).
#[derive(Debug, Clone)]
pub struct PackDownload {
    pub project: RemoteProject,
    pub file: RemoteFile,
    /// Where the archive now lives.
    pub path: PathBuf,
    /// Bytes transferred in this run; zero when the archive was already there.
    pub bytes: u64,
}

impl PackDownload {
    /// Whether the archive was already present and nothing was fetched.
    pub fn was_present(&self) -> bool {
        self.bytes == 0
    }
}
