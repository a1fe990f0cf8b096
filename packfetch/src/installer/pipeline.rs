//! The install pipeline.
//!
//! 1. Parse the manifest from the archive
//! 2. Extract overrides into the install root
//! 3. Resolve file names and URLs
//! 4. Classify projects into destination folders
//! 5. Download every resolved file
//! 6. Persist the resolved manifest
//!
//! Only archive and filesystem problems in steps 1, 2 and 6 abort a run;
//! everything per entry lands in the [`InstallReport`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use super::archive::PackArchive;
use super::classify::{classify_projects, is_plain_file_name, DownloadTarget};
use super::config::InstallerConfig;
use super::download::{
    download_all, DownloadJob, DownloadOptions, FileFetcher, HttpFetcher, RetryPolicy,
};
use super::error::{InstallError, InstallResult};
use super::observer::{InstallObserver, InstallStage, NoopObserver, ObserverHandle};
use super::pack::{select_latest_file, PackDownload};
use super::pool::TaskPool;
use super::report::{EntryOutcome, EntryReport, InstallReport};
use super::resolve::{resolve_entries, Resolution};
use crate::catalog::{CatalogClient, ContentClass};
use crate::cdn::build_cdn_url;
use crate::manifest::Manifest;

/// Parse the manifest of the pack at `archive` without any network access.
pub async fn inspect(archive: impl AsRef<Path>, manifest_name: &str) -> InstallResult<Manifest> {
    let archive = PackArchive::new(archive.as_ref());
    let name = manifest_name.to_string();
    tokio::task::spawn_blocking(move || archive.read_manifest(&name)).await?
}

/// Installs modpacks from archives.
pub struct ModpackInstaller {
    catalog: Arc<dyn CatalogClient>,
    fetcher: Arc<dyn FileFetcher>,
    config: InstallerConfig,
    observer: ObserverHandle,
}

impl ModpackInstaller {
    /// Create an installer that downloads over HTTP.
    pub fn new(catalog: Arc<dyn CatalogClient>, config: InstallerConfig) -> InstallResult<Self> {
        let fetcher = HttpFetcher::new(config.download_timeout)
            .map_err(|e| InstallError::HttpClient(e.to_string()))?;
        Ok(Self::with_fetcher(catalog, Arc::new(fetcher), config))
    }

    /// Create an installer with a custom fetcher.
    pub fn with_fetcher(
        catalog: Arc<dyn CatalogClient>,
        fetcher: Arc<dyn FileFetcher>,
        config: InstallerConfig,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            config,
            observer: ObserverHandle::new(Arc::new(NoopObserver)),
        }
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn InstallObserver>) -> Self {
        self.observer = ObserverHandle::new(observer);
        self
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Parse the archive's manifest without installing anything.
    pub async fn inspect(&self, archive: impl AsRef<Path>) -> InstallResult<Manifest> {
        inspect(archive, &self.config.manifest_file_name).await
    }

    /// Install the pack at `archive` into `out_dir`.
    pub async fn install(
        &self,
        archive: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> InstallResult<InstallReport> {
        let archive = PackArchive::new(archive.as_ref());
        let out_dir = out_dir.as_ref().to_path_buf();

        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|source| InstallError::CreateDir {
                path: out_dir.clone(),
                source,
            })?;

        let manifest = {
            let archive = archive.clone();
            let name = self.config.manifest_file_name.clone();
            tokio::task::spawn_blocking(move || archive.read_manifest(&name)).await??
        };
        info!(
            name = %manifest.name,
            version = %manifest.version,
            author = %manifest.author,
            files = manifest.entries.len(),
            "Installing modpack"
        );

        let overrides_extracted = self.extract_overrides(&archive, &manifest, &out_dir).await?;

        let pool = TaskPool::new(self.config.concurrency);
        let catalog = self.catalog.as_ref();

        let progress = self
            .observer
            .start(InstallStage::Resolving, manifest.entries.len());
        let resolutions = resolve_entries(
            catalog,
            &manifest.entries,
            &self.config.cdn_base,
            &pool,
            &progress,
        )
        .await;
        progress.finish();

        let resolvable: Vec<_> = resolutions
            .iter()
            .map(|r| &r.entry)
            .filter(|e| e.is_resolved())
            .collect();
        let distinct = resolvable
            .iter()
            .map(|e| e.project_id)
            .collect::<HashSet<_>>()
            .len();
        let progress = self.observer.start(InstallStage::Classifying, distinct);
        let classes = classify_projects(catalog, &resolvable, &pool, &progress).await;
        progress.finish();

        let class_of = |project_id: u32| classes.get(&project_id).copied().unwrap_or_default();
        let (mut slots, planned) = plan_downloads(&resolutions, class_of, &out_dir);
        let (indices, jobs): (Vec<usize>, Vec<DownloadJob>) = planned.into_iter().unzip();

        let progress = self.observer.start(InstallStage::Downloading, jobs.len());
        let outcomes = download_all(&jobs, self.download_options(), &pool, &progress).await;
        progress.finish();

        for (index, outcome) in indices.into_iter().zip(outcomes) {
            slots[index].outcome = outcome;
        }

        let resolved = manifest.with_entries(resolutions.into_iter().map(|r| r.entry).collect());
        let manifest_path = self.write_manifest(&resolved, &out_dir).await?;

        let report = InstallReport {
            manifest: resolved,
            entries: slots,
            overrides_extracted,
            manifest_path,
        };
        info!(
            resolved = report.resolved(),
            unresolved = report.unresolved(),
            downloaded = report.downloaded(),
            already_present = report.already_present(),
            failed = report.failed(),
            bytes = report.bytes_downloaded(),
            "Install finished"
        );
        Ok(report)
    }

    /// Download the newest archive of pack project `project_id` into `out_dir`.
    ///
    /// The file is picked with [`select_latest_file`]. It goes through the
    /// same staging, retry and verification as entry downloads, so an intact
    /// archive already in `out_dir` is not fetched again.
    pub async fn download_pack(
        &self,
        project_id: u32,
        game_version: Option<&str>,
        out_dir: impl AsRef<Path>,
    ) -> InstallResult<PackDownload> {
        let out_dir = out_dir.as_ref();
        let project = self
            .catalog
            .lookup_project(project_id)
            .await
            .map_err(|source| InstallError::ProjectLookup { project_id, source })?;
        info!(project_id, name = %project.name, "Found pack project");

        let file = select_latest_file(&project, game_version)
            .cloned()
            .ok_or_else(|| InstallError::NoPackFile {
                project_id,
                game_version: game_version.filter(|v| !v.is_empty()).map(str::to_string),
            })?;
        if !is_plain_file_name(&file.file_name) {
            return Err(InstallError::UnsafeFileName(file.file_name));
        }
        info!(
            project_id,
            file_id = file.id,
            file_name = %file.file_name,
            bytes = file.file_length,
            "Selected pack file"
        );

        let url = match file.download_url() {
            Some(url) => url.to_string(),
            None => match self.catalog.resolve_download_url(project_id, file.id).await {
                Ok(Some(url)) => url,
                Ok(None) => build_cdn_url(&self.config.cdn_base, file.id, &file.file_name),
                Err(e) => {
                    debug!(
                        project_id,
                        file_id = file.id,
                        error = %e,
                        "Download URL lookup failed, using CDN"
                    );
                    build_cdn_url(&self.config.cdn_base, file.id, &file.file_name)
                }
            },
        };

        tokio::fs::create_dir_all(out_dir)
            .await
            .map_err(|source| InstallError::CreateDir {
                path: out_dir.to_path_buf(),
                source,
            })?;

        let job = DownloadJob {
            project_id,
            file_id: file.id,
            file_name: file.file_name.clone(),
            url,
            target: out_dir.join(&file.file_name),
            fingerprint: Some(file.fingerprint).filter(|f| *f != 0),
        };
        let progress = self.observer.start(InstallStage::Downloading, 1);
        let outcome = download_all(
            std::slice::from_ref(&job),
            self.download_options(),
            &TaskPool::new(1),
            &progress,
        )
        .await
        .pop();
        progress.finish();

        match outcome {
            Some(EntryOutcome::Downloaded { path, bytes }) => Ok(PackDownload {
                project,
                file,
                path,
                bytes,
            }),
            Some(EntryOutcome::AlreadyPresent { path }) => {
                info!(path = %path.display(), "Pack archive already present");
                Ok(PackDownload {
                    project,
                    file,
                    path,
                    bytes: 0,
                })
            }
            Some(EntryOutcome::Failed { attempts, reason }) => Err(InstallError::PackDownload {
                file_name: file.file_name,
                attempts,
                reason,
            }),
            Some(EntryOutcome::Unresolved { reason }) => Err(InstallError::PackDownload {
                file_name: file.file_name,
                attempts: 0,
                reason,
            }),
            None => Err(InstallError::PackDownload {
                file_name: file.file_name,
                attempts: 0,
                reason: "download was not scheduled".to_string(),
            }),
        }
    }

    fn download_options(&self) -> DownloadOptions<'_> {
        DownloadOptions {
            fetcher: self.fetcher.as_ref(),
            policy: RetryPolicy::new(self.config.max_retries, self.config.backoff_unit),
            verify_existing: self.config.verify_existing,
        }
    }

    async fn extract_overrides(
        &self,
        archive: &PackArchive,
        manifest: &Manifest,
        out_dir: &Path,
    ) -> InstallResult<usize> {
        let progress = self.observer.start(InstallStage::ExtractingOverrides, 0);
        let count = {
            let archive = archive.clone();
            let prefix = manifest.overrides.clone();
            let dest = out_dir.to_path_buf();
            tokio::task::spawn_blocking(move || archive.extract_overrides(&prefix, &dest)).await??
        };
        progress.finish();
        Ok(count)
    }

    /// Write the resolved manifest via a temporary file and rename.
    async fn write_manifest(&self, manifest: &Manifest, out_dir: &Path) -> InstallResult<PathBuf> {
        let progress = self.observer.start(InstallStage::WritingManifest, 1);

        let path = out_dir.join(&self.config.manifest_file_name);
        let staging = out_dir.join(format!("{}.tmp", self.config.manifest_file_name));
        let json = manifest
            .to_json_pretty()
            .map_err(InstallError::ManifestSerialize)?;

        tokio::fs::write(&staging, json)
            .await
            .map_err(|source| InstallError::Write {
                path: staging.clone(),
                source,
            })?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|source| InstallError::Write {
                path: path.clone(),
                source,
            })?;

        progress.advance(&self.config.manifest_file_name);
        progress.finish();
        info!(path = %path.display(), "Resolved manifest saved");
        Ok(path)
    }
}

/// Build one report slot per entry and a job per downloadable entry.
///
/// Slots start as unresolved or failed; download outcomes overwrite the
/// slots of entries that get a job.
fn plan_downloads(
    resolutions: &[Resolution],
    class_of: impl Fn(u32) -> ContentClass,
    out_dir: &Path,
) -> (Vec<EntryReport>, Vec<(usize, DownloadJob)>) {
    let mut slots = Vec::with_capacity(resolutions.len());
    let mut jobs = Vec::new();

    for (index, resolution) in resolutions.iter().enumerate() {
        let entry = &resolution.entry;
        let mut slot = EntryReport {
            project_id: entry.project_id,
            file_id: entry.file_id,
            file_name: entry.file_name().map(str::to_string),
            class: None,
            outcome: EntryOutcome::Unresolved {
                reason: resolution
                    .failure
                    .clone()
                    .unwrap_or_else(|| "no file name or URL".to_string()),
            },
        };

        if entry.is_resolved() {
            let class = class_of(entry.project_id);
            slot.class = Some(class);
            match DownloadTarget::plan(entry, class, out_dir) {
                Ok(target) => jobs.push((
                    index,
                    DownloadJob {
                        project_id: entry.project_id,
                        file_id: entry.file_id,
                        file_name: entry.file_name().unwrap_or_default().to_string(),
                        url: entry.url().unwrap_or_default().to_string(),
                        target: target.path,
                        fingerprint: resolution.fingerprint,
                    },
                )),
                Err(reason) => {
                    error!(
                        project_id = entry.project_id,
                        file_id = entry.file_id,
                        reason = %reason,
                        "Refusing to download outside the install directory"
                    );
                    slot.outcome = EntryOutcome::Failed {
                        attempts: 0,
                        reason,
                    };
                }
            }
        }
        slots.push(slot);
    }

    (slots, jobs)
}
