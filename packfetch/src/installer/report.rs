//! Per-entry outcomes and the run summary.

use std::path::PathBuf;

use crate::catalog::ContentClass;
use crate::manifest::Manifest;

/// What happened to one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The file was streamed to disk in this run.
    Downloaded { path: PathBuf, bytes: u64 },
    /// The destination already held the file.
    AlreadyPresent { path: PathBuf },
    /// No file name or URL could be determined; nothing was downloaded.
    Unresolved { reason: String },
    /// Every download attempt failed.
    Failed { attempts: u32, reason: String },
}

impl EntryOutcome {
    /// Whether the file is on disk after the run.
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Downloaded { .. } | Self::AlreadyPresent { .. })
    }
}

/// Outcome of one entry together with its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub project_id: u32,
    pub file_id: u32,
    pub file_name: Option<String>,
    /// Destination bucket, when the entry reached classification.
    pub class: Option<ContentClass>,
    pub outcome: EntryOutcome,
}

/// Summary of an install run.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// The resolved manifest, as persisted.
    pub manifest: Manifest,
    /// One report per manifest entry, in manifest order.
    pub entries: Vec<EntryReport>,
    /// Number of override files copied from the archive.
    pub overrides_extracted: usize,
    /// Where the resolved manifest was written.
    pub manifest_path: PathBuf,
}

impl InstallReport {
    fn count(&self, predicate: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }

    /// Entries that ended with a file name and URL.
    pub fn resolved(&self) -> usize {
        self.entries.len() - self.unresolved()
    }

    pub fn unresolved(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Unresolved { .. }))
    }

    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Downloaded { .. }))
    }

    pub fn already_present(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::AlreadyPresent { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed { .. }))
    }

    /// Bytes streamed in this run.
    pub fn bytes_downloaded(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| match e.outcome {
                EntryOutcome::Downloaded { bytes, .. } => bytes,
                _ => 0,
            })
            .sum()
    }

    /// True when every entry ended up on disk.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.outcome.is_installed())
    }
}
