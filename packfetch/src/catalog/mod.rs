//! Remote catalog boundary.
//!
//! The installer only needs three lookups from the catalog. They are expressed
//! as the [`CatalogClient`] trait so the pipeline can run against the real
//! REST client ([`CurseForgeClient`]) or a scripted one in tests.
//!
//! The trait uses boxed futures so it stays dyn-compatible
//! (`Arc<dyn CatalogClient>`).

mod error;
mod http;
mod types;

pub use error::{CatalogError, CatalogResult};
pub use http::{CatalogConfig, CurseForgeClient, DEFAULT_API_BASE};
pub use types::{
    ContentClass, RemoteFile, RemoteProject, CLASS_BUKKIT_PLUGIN, CLASS_CUSTOMIZATION, CLASS_MOD,
    CLASS_MODPACK, CLASS_RESOURCE_PACK, CLASS_SHADER_PACK, CLASS_WORLD,
};

use std::future::Future;
use std::pin::Pin;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async lookups the installer performs against the catalog.
///
/// Implementations are responsible for bounding their own concurrency.
pub trait CatalogClient: Send + Sync {
    /// Fetch project metadata.
    fn lookup_project(&self, project_id: u32) -> BoxFuture<'_, CatalogResult<RemoteProject>>;

    /// Fetch metadata for one file of a project.
    fn lookup_file(
        &self,
        project_id: u32,
        file_id: u32,
    ) -> BoxFuture<'_, CatalogResult<RemoteFile>>;

    /// Ask the catalog for a file's download URL.
    ///
    /// `Ok(None)` means the catalog has no URL to offer (distribution
    /// disabled); callers fall back to the CDN URL.
    fn resolve_download_url(
        &self,
        project_id: u32,
        file_id: u32,
    ) -> BoxFuture<'_, CatalogResult<Option<String>>>;
}

impl<C: CatalogClient + ?Sized> CatalogClient for std::sync::Arc<C> {
    fn lookup_project(&self, project_id: u32) -> BoxFuture<'_, CatalogResult<RemoteProject>> {
        (**self).lookup_project(project_id)
    }

    fn lookup_file(
        &self,
        project_id: u32,
        file_id: u32,
    ) -> BoxFuture<'_, CatalogResult<RemoteFile>> {
        (**self).lookup_file(project_id, file_id)
    }

    fn resolve_download_url(
        &self,
        project_id: u32,
        file_id: u32,
    ) -> BoxFuture<'_, CatalogResult<Option<String>>> {
        (**self).resolve_download_url(project_id, file_id)
    }
}
