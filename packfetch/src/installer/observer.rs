//! Progress observation for installs.
//!
//! Observers are informed of stage boundaries and per-item completion. They
//! never influence control flow: a panicking observer is logged and ignored.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Installation stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallStage {
    /// Copying the archive's override files.
    ExtractingOverrides,
    /// Looking up file names and URLs.
    Resolving,
    /// Looking up project classes to pick destination folders.
    Classifying,
    /// Streaming files to disk.
    Downloading,
    /// Persisting the resolved manifest.
    WritingManifest,
}

impl InstallStage {
    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExtractingOverrides => "Extracting overrides",
            Self::Resolving => "Resolving files",
            Self::Classifying => "Querying project types",
            Self::Downloading => "Downloading files",
            Self::WritingManifest => "Writing manifest",
        }
    }
}

impl std::fmt::Display for InstallStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives install progress. Every method defaults to a no-op.
pub trait InstallObserver: Send + Sync {
    /// A stage is starting with `total` items.
    fn stage_started(&self, _stage: InstallStage, _total: usize) {}

    /// One item of `stage` finished; `done` counts completions so far.
    fn item_finished(&self, _stage: InstallStage, _done: usize, _total: usize, _label: &str) {}

    /// A stage has finished.
    fn stage_finished(&self, _stage: InstallStage) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl InstallObserver for NoopObserver {}

/// Panic-isolating handle around an observer.
#[derive(Clone)]
pub(crate) struct ObserverHandle {
    inner: Arc<dyn InstallObserver>,
}

impl ObserverHandle {
    pub(crate) fn new(inner: Arc<dyn InstallObserver>) -> Self {
        Self { inner }
    }

    fn notify(&self, callback: &'static str, f: impl FnOnce(&dyn InstallObserver)) {
        let observer = self.inner.as_ref();
        if catch_unwind(AssertUnwindSafe(|| f(observer))).is_err() {
            warn!(callback, "Progress observer panicked; ignoring");
        }
    }

    /// Announce `stage` and return a counter for its items.
    pub(crate) fn start(&self, stage: InstallStage, total: usize) -> StageProgress {
        self.notify("stage_started", |o| o.stage_started(stage, total));
        StageProgress {
            observer: self.clone(),
            stage,
            total,
            done: AtomicUsize::new(0),
        }
    }
}

/// Completion counter for one running stage.
pub(crate) struct StageProgress {
    observer: ObserverHandle,
    stage: InstallStage,
    total: usize,
    done: AtomicUsize,
}

impl StageProgress {
    /// Record one finished item.
    pub(crate) fn advance(&self, label: &str) {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        let (stage, total) = (self.stage, self.total);
        self.observer
            .notify("item_finished", |o| o.item_finished(stage, done, total, label));
    }

    /// Close the stage.
    pub(crate) fn finish(self) {
        let stage = self.stage;
        self.observer
            .notify("stage_finished", |o| o.stage_finished(stage));
    }
}
