//! Error types for the installer.
//!
//! Only the conditions listed here abort a run. Per-entry lookup and
//! download failures are folded into the [`InstallReport`](super::InstallReport)
//! instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;

/// Result type for installer operations.
pub type InstallResult<T> = Result<T, InstallError>;

/// Fatal installer errors.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The archive could not be opened.
    #[error("failed to open archive {}: {source}", .path.display())]
    ArchiveOpen { path: PathBuf, source: io::Error },

    /// The archive is not a readable zip.
    #[error("failed to read archive {}: {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    /// No manifest document at the root or one level down.
    #[error("no {name} found in archive {}", .path.display())]
    ManifestNotFound { path: PathBuf, name: String },

    /// The manifest document is not valid JSON of the expected shape.
    #[error("failed to parse manifest {entry}: {source}")]
    ManifestParse {
        entry: String,
        source: serde_json::Error,
    },

    /// A directory under the install root could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// A file under the install root could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The resolved manifest could not be serialized.
    #[error("failed to serialize resolved manifest: {0}")]
    ManifestSerialize(serde_json::Error),

    /// The download client could not be built.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    /// The catalog could not describe a pack project.
    #[error("failed to look up project {project_id}: {source}")]
    ProjectLookup {
        project_id: u32,
        source: CatalogError,
    },

    /// The project lists no file suitable for download.
    #[error(
        "no downloadable file for project {project_id}{}",
        game_version_suffix(.game_version)
    )]
    NoPackFile {
        project_id: u32,
        game_version: Option<String>,
    },

    /// The catalog file name would escape the output directory.
    #[error("refusing unsafe file name {0:?}")]
    UnsafeFileName(String),

    /// Every attempt to fetch the pack archive failed.
    #[error("failed to download {file_name} after {attempts} attempts: {reason}")]
    PackDownload {
        file_name: String,
        attempts: u32,
        reason: String,
    },

    /// A blocking worker panicked or was cancelled.
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

fn game_version_suffix(game_version: &Option<String>) -> String {
    match game_version {
        Some(v) => format!(" (game version {})", v),
        None => String::new(),
    }
}

impl From<tokio::task::JoinError> for InstallError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InstallError::ManifestNotFound {
            path: PathBuf::from("/tmp/pack.zip"),
            name: "manifest.json".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no manifest.json found in archive /tmp/pack.zip"
        );

        let err = InstallError::CreateDir {
            path: PathBuf::from("/out/mods"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/out/mods"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_no_pack_file_names_version() {
        let err = InstallError::NoPackFile {
            project_id: 925200,
            game_version: Some("1.21.1".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "no downloadable file for project 925200 (game version 1.21.1)"
        );

        let err = InstallError::NoPackFile {
            project_id: 925200,
            game_version: None,
        };
        assert_eq!(err.to_string(), "no downloadable file for project 925200");
    }
}
