//! File resolution: turning `(projectID, fileID)` into a file name and URL.

use tracing::{debug, error, info, warn};

use super::observer::StageProgress;
use super::pool::TaskPool;
use crate::catalog::{CatalogClient, RemoteFile};
use crate::cdn::build_cdn_url;
use crate::manifest::ManifestEntry;

/// Result of resolving one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolution {
    /// The entry with `fileName`/`url` filled in, or unchanged on failure.
    pub entry: ManifestEntry,
    /// Non-zero catalog fingerprint, when the catalog was asked.
    pub fingerprint: Option<u32>,
    /// Why resolution failed.
    pub failure: Option<String>,
}

impl Resolution {
    fn unchanged(entry: &ManifestEntry) -> Self {
        Self {
            entry: entry.clone(),
            fingerprint: None,
            failure: None,
        }
    }

    fn failed(entry: &ManifestEntry, reason: String) -> Self {
        Self {
            entry: entry.clone(),
            fingerprint: None,
            failure: Some(reason),
        }
    }
}

/// Resolve every entry once, in parallel, keeping input order.
///
/// Entries that already carry both a file name and a URL make no network
/// call. Lookup failures never abort the stage.
pub(crate) async fn resolve_entries(
    catalog: &dyn CatalogClient,
    entries: &[ManifestEntry],
    cdn_base: &str,
    pool: &TaskPool,
    progress: &StageProgress,
) -> Vec<Resolution> {
    let resolutions = pool
        .run_all(entries.iter().map(|entry| async move {
            let resolution = resolve_one(catalog, entry, cdn_base).await;
            let label = resolution
                .entry
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}/{}", entry.project_id, entry.file_id));
            progress.advance(&label);
            resolution
        }))
        .await;

    let resolved = resolutions.iter().filter(|r| r.entry.is_resolved()).count();
    info!(resolved, total = entries.len(), "Resolved files");
    resolutions
}

async fn resolve_one(catalog: &dyn CatalogClient, entry: &ManifestEntry, cdn_base: &str) -> Resolution {
    if entry.is_resolved() {
        return Resolution::unchanged(entry);
    }

    let (project_id, file_id) = (entry.project_id, entry.file_id);
    let file = match catalog.lookup_file(project_id, file_id).await {
        Ok(file) => file,
        Err(e) if e.is_not_found() => {
            warn!(project_id, file_id, "File not found in catalog, removed upstream?");
            return Resolution::failed(entry, e.to_string());
        }
        Err(e) => {
            error!(project_id, file_id, error = %e, "Failed to resolve file");
            return Resolution::failed(entry, e.to_string());
        }
    };

    if file.file_name.is_empty() {
        error!(project_id, file_id, "Catalog returned a file without a name");
        return Resolution::failed(entry, "catalog returned no file name".to_string());
    }

    let url = download_url(catalog, entry, &file, cdn_base).await;
    debug!(project_id, file_id, file_name = %file.file_name, url = %url, "Resolved");

    Resolution {
        fingerprint: Some(file.fingerprint).filter(|f| *f != 0),
        entry: entry.clone().with_resolution(file.file_name, url),
        failure: None,
    }
}

/// Catalog URL if present, then the download-url endpoint, then the CDN.
async fn download_url(
    catalog: &dyn CatalogClient,
    entry: &ManifestEntry,
    file: &RemoteFile,
    cdn_base: &str,
) -> String {
    if let Some(url) = file.download_url() {
        return url.to_string();
    }

    match catalog
        .resolve_download_url(entry.project_id, file.id)
        .await
    {
        Ok(Some(url)) => return url,
        Ok(None) => {}
        Err(e) => debug!(
            project_id = entry.project_id,
            file_id = file.id,
            error = %e,
            "Download URL lookup failed, using CDN"
        ),
    }

    build_cdn_url(cdn_base, file.id, &file.file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::observer::{InstallStage, NoopObserver, ObserverHandle};
    use crate::test_support::MockCatalog;
    use std::sync::Arc;

    const CDN: &str = "https://cdn.test";

    async fn resolve(catalog: &MockCatalog, entries: &[ManifestEntry]) -> Vec<Resolution> {
        let handle = ObserverHandle::new(Arc::new(NoopObserver));
        let progress = handle.start(InstallStage::Resolving, entries.len());
        resolve_entries(catalog, entries, CDN, &TaskPool::new(4), &progress).await
    }

    #[tokio::test]
    async fn test_pre_resolved_entries_skip_the_catalog() {
        let catalog = MockCatalog::default();
        let entries =
            vec![ManifestEntry::new(1, 10).with_resolution("a.jar", "https://host/a.jar")];

        let out = resolve(&catalog, &entries).await;

        assert_eq!(out[0].entry, entries[0]);
        assert_eq!(out[0].fingerprint, None);
        assert_eq!(catalog.file_lookups(), 0);
    }

    #[tokio::test]
    async fn test_catalog_url_is_used_verbatim() {
        let catalog =
            MockCatalog::default().with_file(1, 10, "a.jar", Some("https://host/a.jar"), 99);

        let out = resolve(&catalog, &[ManifestEntry::new(1, 10)]).await;

        assert_eq!(out[0].entry.file_name(), Some("a.jar"));
        assert_eq!(out[0].entry.url(), Some("https://host/a.jar"));
        assert_eq!(out[0].fingerprint, Some(99));
        assert_eq!(catalog.url_lookups(), 0);
    }

    #[tokio::test]
    async fn test_download_url_endpoint_fallback() {
        let catalog = MockCatalog::default()
            .with_file(1, 10, "a.jar", None, 0)
            .with_download_url(1, 10, "https://edge/a.jar");

        let out = resolve(&catalog, &[ManifestEntry::new(1, 10)]).await;

        assert_eq!(out[0].entry.url(), Some("https://edge/a.jar"));
        assert_eq!(out[0].fingerprint, None);
    }

    #[tokio::test]
    async fn test_cdn_fallback() {
        let catalog = MockCatalog::default().with_file(1, 5433036, "My Mod.jar", Some(""), 0);

        let out = resolve(&catalog, &[ManifestEntry::new(1, 5433036)]).await;

        assert_eq!(
            out[0].entry.url(),
            Some("https://cdn.test/files/5433/36/My Mod.jar")
        );
        assert_eq!(catalog.url_lookups(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_ordered() {
        let catalog = MockCatalog::default()
            .with_file(1, 10, "a.jar", Some("https://host/a.jar"), 0)
            .with_file(3, 30, "c.jar", Some("https://host/c.jar"), 0)
            .with_broken_file(4, 40);
        let entries = vec![
            ManifestEntry::new(1, 10),
            ManifestEntry::new(2, 20),
            ManifestEntry::new(3, 30),
            ManifestEntry::new(4, 40),
        ];

        let out = resolve(&catalog, &entries).await;

        let ids: Vec<u32> = out.iter().map(|r| r.entry.file_id).collect();
        assert_eq!(ids, vec![10, 20, 30, 40]);
        assert!(out[0].entry.is_resolved());
        assert!(!out[1].entry.is_resolved());
        assert!(out[1].failure.as_deref().unwrap().contains("not found"));
        assert!(out[2].entry.is_resolved());
        assert!(!out[3].entry.is_resolved());
        assert!(out[3].failure.as_deref().unwrap().contains("500"));
        assert_eq!(catalog.file_lookups(), 4);
    }

    #[tokio::test]
    async fn test_nameless_file_is_unresolved() {
        let catalog = MockCatalog::default().with_file(1, 10, "", Some("https://host/x"), 0);

        let out = resolve(&catalog, &[ManifestEntry::new(1, 10)]).await;

        assert!(!out[0].entry.is_resolved());
        assert!(out[0].failure.is_some());
    }
}
