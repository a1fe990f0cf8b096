//! Download fan-out with retry, backoff and `.part` staging.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use super::retry::RetryPolicy;
use super::verify::{check_existing, ExistingFile};
use super::{FetchError, FileFetcher};
use crate::installer::observer::StageProgress;
use crate::installer::pool::TaskPool;
use crate::installer::report::EntryOutcome;

/// One file to put on disk.
#[derive(Debug, Clone)]
pub(crate) struct DownloadJob {
    pub project_id: u32,
    pub file_id: u32,
    pub file_name: String,
    pub url: String,
    pub target: PathBuf,
    /// Catalog fingerprint learned during resolution, if any.
    pub fingerprint: Option<u32>,
}

/// Settings shared by every job in one run.
#[derive(Clone, Copy)]
pub(crate) struct DownloadOptions<'a> {
    pub fetcher: &'a dyn FileFetcher,
    pub policy: RetryPolicy,
    pub verify_existing: bool,
}

/// Download every job through `pool`, returning outcomes in job order.
///
/// Failures are isolated per job; nothing here aborts siblings. Jobs sharing
/// a target path are fetched once: later jobs wait for the first and report
/// its file as already present, so two transfers never share a `.part` file.
pub(crate) async fn download_all(
    jobs: &[DownloadJob],
    options: DownloadOptions<'_>,
    pool: &TaskPool,
    progress: &StageProgress,
) -> Vec<EntryOutcome> {
    let mut first_for_target: HashMap<&Path, usize> = HashMap::new();
    let leaders: Vec<Option<usize>> = jobs
        .iter()
        .enumerate()
        .map(|(index, job)| match first_for_target.entry(job.target.as_path()) {
            Entry::Occupied(first) => Some(*first.get()),
            Entry::Vacant(slot) => {
                slot.insert(index);
                None
            }
        })
        .collect();

    let unique: Vec<(usize, &DownloadJob)> = jobs
        .iter()
        .enumerate()
        .filter(|(index, _)| leaders[*index].is_none())
        .collect();
    let fetched = pool
        .run_all(unique.iter().map(|(_, job)| async move {
            let outcome = download_one(job, options).await;
            progress.advance(&job.file_name);
            outcome
        }))
        .await;

    let mut outcomes: Vec<Option<EntryOutcome>> = vec![None; jobs.len()];
    for ((index, _), outcome) in unique.iter().zip(fetched) {
        outcomes[*index] = Some(outcome);
    }

    for (index, leader) in leaders.iter().enumerate() {
        let Some(leader) = *leader else {
            continue;
        };
        let job = &jobs[index];
        warn!(
            project_id = job.project_id,
            file_id = job.file_id,
            path = %job.target.display(),
            "Another entry already targets this path; sharing its download"
        );
        let shared = outcomes[leader].as_ref().map(shared_outcome);
        outcomes[index] = shared;
        progress.advance(&job.file_name);
    }

    outcomes
        .into_iter()
        .map(|outcome| {
            outcome.unwrap_or_else(|| EntryOutcome::Failed {
                attempts: 0,
                reason: "download was not scheduled".to_string(),
            })
        })
        .collect()
}

/// Outcome for a job whose target was handled by an earlier job.
fn shared_outcome(leader: &EntryOutcome) -> EntryOutcome {
    match leader {
        EntryOutcome::Downloaded { path, .. } | EntryOutcome::AlreadyPresent { path } => {
            EntryOutcome::AlreadyPresent { path: path.clone() }
        }
        other => other.clone(),
    }
}

/// Staging path for `target`: the same name with `.part` appended.
pub(crate) fn staging_path(target: &Path) -> PathBuf {
    let mut name: OsString = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

async fn remove_if_present(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial file"),
    }
}

async fn download_one(job: &DownloadJob, options: DownloadOptions<'_>) -> EntryOutcome {
    let expected = job.fingerprint.filter(|_| options.verify_existing);
    match check_existing(&job.target, expected).await {
        ExistingFile::Intact => {
            debug!(path = %job.target.display(), "Skipping existing file");
            return EntryOutcome::AlreadyPresent {
                path: job.target.clone(),
            };
        }
        ExistingFile::Mismatch { expected, actual } => {
            warn!(
                project_id = job.project_id,
                file_id = job.file_id,
                path = %job.target.display(),
                expected,
                actual = ?actual,
                "Existing file does not match catalog fingerprint, downloading again"
            );
            remove_if_present(&job.target).await;
        }
        ExistingFile::Missing => {}
    }

    if let Some(parent) = job.target.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            let reason = FetchError::io(parent, e).to_string();
            error!(
                project_id = job.project_id,
                file_id = job.file_id,
                error = %reason,
                "Cannot create destination directory"
            );
            return EntryOutcome::Failed {
                attempts: 0,
                reason,
            };
        }
    }

    let part = staging_path(&job.target);
    let max_attempts = options.policy.max_attempts();
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        remove_if_present(&part).await;

        let result = match options.fetcher.fetch(&job.url, &part).await {
            Ok(bytes) => tokio::fs::rename(&part, &job.target)
                .await
                .map(|()| bytes)
                .map_err(|e| FetchError::io(&job.target, e)),
            Err(e) => Err(e),
        };

        match result {
            Ok(bytes) => {
                debug!(
                    project_id = job.project_id,
                    file_id = job.file_id,
                    attempt,
                    bytes,
                    path = %job.target.display(),
                    "Downloaded"
                );
                return EntryOutcome::Downloaded {
                    path: job.target.clone(),
                    bytes,
                };
            }
            Err(e) => last_error = e.to_string(),
        }

        let Some(delay) = options.policy.delay_after(attempt) else {
            break;
        };
        warn!(
            project_id = job.project_id,
            file_id = job.file_id,
            file_name = %job.file_name,
            attempt,
            max_attempts,
            retry_in_ms = delay.as_millis() as u64,
            error = %last_error,
            "Download failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }

    remove_if_present(&part).await;
    error!(
        project_id = job.project_id,
        file_id = job.file_id,
        file_name = %job.file_name,
        attempts = max_attempts,
        error = %last_error,
        "Download failed after all attempts"
    );
    EntryOutcome::Failed {
        attempts: max_attempts,
        reason: last_error,
    }
}
