//! Checks on files already present at a download target.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::fingerprint::fingerprint_file;

/// State of a download target before streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExistingFile {
    Missing,
    /// Present and either verified or not checkable.
    Intact,
    /// Present but its content does not match the catalog fingerprint.
    Mismatch { expected: u32, actual: Option<u32> },
}

/// Inspect `path`, comparing against `expected` when one is known.
///
/// A zero fingerprint means the catalog did not report one.
pub(crate) async fn check_existing(path: &Path, expected: Option<u32>) -> ExistingFile {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return ExistingFile::Missing,
    }

    let Some(expected) = expected.filter(|f| *f != 0) else {
        return ExistingFile::Intact;
    };

    let owned: PathBuf = path.to_path_buf();
    let actual = match tokio::task::spawn_blocking(move || fingerprint_file(&owned)).await {
        Ok(Ok(actual)) => Some(actual),
        Ok(Err(e)) => {
            warn!(path = %path.display(), error = %e, "Could not read existing file");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Fingerprint task failed");
            None
        }
    };

    if actual == Some(expected) {
        ExistingFile::Intact
    } else {
        ExistingFile::Mismatch { expected, actual }
    }
}
