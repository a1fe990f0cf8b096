//! Pack archive access.
//!
//! A pack is a zip holding a manifest document plus an overrides subtree that
//! is copied verbatim into the install root. Both operations here are
//! synchronous; the installer runs them on the blocking pool.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::error::{InstallError, InstallResult};
use crate::manifest::Manifest;

/// A pack archive on disk.
#[derive(Debug, Clone)]
pub struct PackArchive {
    path: PathBuf,
}

impl PackArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> InstallResult<ZipArchive<File>> {
        let file = File::open(&self.path).map_err(|source| InstallError::ArchiveOpen {
            path: self.path.clone(),
            source,
        })?;
        ZipArchive::new(file).map_err(|source| self.read_error(source))
    }

    fn read_error(&self, source: zip::result::ZipError) -> InstallError {
        InstallError::ArchiveRead {
            path: self.path.clone(),
            source,
        }
    }

    /// Locate and parse the manifest named `name`.
    ///
    /// The document is looked up at the archive root first, then exactly one
    /// directory deep (packs zipped together with their parent folder).
    pub fn read_manifest(&self, name: &str) -> InstallResult<Manifest> {
        let mut zip = self.open()?;

        let entry_name = find_manifest_entry(zip.file_names(), name).ok_or_else(|| {
            InstallError::ManifestNotFound {
                path: self.path.clone(),
                name: name.to_string(),
            }
        })?;

        let mut bytes = Vec::new();
        zip.by_name(&entry_name)
            .map_err(|e| self.read_error(e))?
            .read_to_end(&mut bytes)
            .map_err(|e| self.read_error(e.into()))?;

        debug!(entry = %entry_name, bytes = bytes.len(), "Read manifest");

        Manifest::from_slice(&bytes).map_err(|source| InstallError::ManifestParse {
            entry: entry_name,
            source,
        })
    }

    /// Extract every file under `prefix` into `dest`, stripping the prefix.
    ///
    /// Directory entries and the bare prefix are skipped. Entries whose
    /// remaining path would escape `dest` are skipped with a warning.
    /// Returns the number of files written.
    pub fn extract_overrides(&self, prefix: &str, dest: &Path) -> InstallResult<usize> {
        let mut zip = self.open()?;
        let prefix = format!("{}/", prefix.trim_matches('/'));
        let mut count = 0;

        for index in 0..zip.len() {
            let mut file = zip.by_index(index).map_err(|e| self.read_error(e))?;
            let name = file.name().to_string();

            let Some(relative) = name.strip_prefix(&prefix) else {
                continue;
            };
            if relative.is_empty() || file.is_dir() {
                continue;
            }
            let Some(relative) = sanitize_relative(relative) else {
                warn!(entry = %name, "Skipping override that escapes the install directory");
                continue;
            };

            let target = dest.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|source| InstallError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            let mut out = File::create(&target).map_err(|source| InstallError::Write {
                path: target.clone(),
                source,
            })?;
            io::copy(&mut file, &mut out).map_err(|source| InstallError::Write {
                path: target.clone(),
                source,
            })?;
            count += 1;
        }

        info!(count, prefix = %prefix, "Extracted override files");
        Ok(count)
    }
}

fn find_manifest_entry<'a>(names: impl Iterator<Item = &'a str>, wanted: &str) -> Option<String> {
    let mut nested = None;
    for name in names {
        if name == wanted {
            return Some(name.to_string());
        }
        if nested.is_none() {
            if let Some((dir, file)) = name.split_once('/') {
                if file == wanted && !dir.is_empty() {
                    nested = Some(name.to_string());
                }
            }
        }
    }
    nested
}

/// Normalize an archive-relative path, rejecting anything that could land
/// outside the directory it is joined onto.
pub(crate) fn sanitize_relative(relative: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}
