//! Classification: choosing a destination folder from the project class.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use moka::future::Cache;
use tracing::{debug, info, warn};

use super::observer::StageProgress;
use super::pool::TaskPool;
use crate::catalog::{CatalogClient, ContentClass};
use crate::manifest::ManifestEntry;

/// A resolved entry paired with its absolute destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub entry: ManifestEntry,
    pub class: ContentClass,
    pub path: PathBuf,
}

impl DownloadTarget {
    /// Place `entry` under `root/<class dir>/<file name>`.
    ///
    /// Fails when the entry is unresolved or its file name is not a single
    /// plain path component.
    pub fn plan(entry: &ManifestEntry, class: ContentClass, root: &Path) -> Result<Self, String> {
        let file_name = entry
            .file_name()
            .ok_or_else(|| "entry has no file name".to_string())?;
        if !is_plain_file_name(file_name) {
            return Err(format!("unsafe file name {:?}", file_name));
        }
        Ok(Self {
            entry: entry.clone(),
            class,
            path: root.join(class.directory()).join(file_name),
        })
    }
}

pub(crate) fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Per-run project class cache.
///
/// Concurrent requests for one project share a single in-flight lookup. A
/// failed lookup is cached as [`ContentClass::Mod`] for the rest of the run.
pub(crate) struct ClassCache {
    cache: Cache<u32, ContentClass>,
}

impl ClassCache {
    pub(crate) fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity.max(1)).build(),
        }
    }

    pub(crate) async fn class_of(&self, catalog: &dyn CatalogClient, project_id: u32) -> ContentClass {
        self.cache
            .get_with(project_id, async move {
                match catalog.lookup_project(project_id).await {
                    Ok(project) => {
                        let class = project.content_class();
                        debug!(project_id, class_id = ?project.class_id, %class, "Classified project");
                        class
                    }
                    Err(e) => {
                        warn!(project_id, error = %e, "Could not get project class, defaulting to mods");
                        ContentClass::Mod
                    }
                }
            })
            .await
    }
}

/// Look up the class of every distinct project among `entries`.
///
/// Projects are dispatched in first-appearance order. Each is queried once.
pub(crate) async fn classify_projects(
    catalog: &dyn CatalogClient,
    entries: &[&ManifestEntry],
    pool: &TaskPool,
    progress: &StageProgress,
) -> HashMap<u32, ContentClass> {
    let mut seen = HashSet::new();
    let project_ids: Vec<u32> = entries
        .iter()
        .map(|e| e.project_id)
        .filter(|id| seen.insert(*id))
        .collect();

    let cache = ClassCache::new(project_ids.len() as u64);
    let cache = &cache;
    let classes = pool
        .run_all(project_ids.iter().map(|&project_id| async move {
            let class = cache.class_of(catalog, project_id).await;
            progress.advance(&project_id.to_string());
            (project_id, class)
        }))
        .await;

    info!(projects = classes.len(), "Classified projects");
    classes.into_iter().collect()
}
