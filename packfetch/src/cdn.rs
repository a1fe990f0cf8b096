//! Download URL construction for catalog files.
//!
//! When the catalog withholds a download URL (the author disabled third-party
//! distribution) the file is still reachable on the CDN under a path sharded
//! by file id:
//!
//! ```text
//! {base}/files/{file_id / 1000}/{file_id % 1000}/{file_name}
//! ```
//!
//! The file name is inserted verbatim. The CDN expects the raw name, so no
//! percent-encoding is applied.

/// Default CDN host for catalog files.
pub const DEFAULT_CDN_BASE: &str = "https://edge.forgecdn.net";

/// Build the CDN URL for a file from its id and name.
pub fn build_cdn_url(base: &str, file_id: u32, file_name: &str) -> String {
    format!(
        "{}/files/{}/{}/{}",
        base.trim_end_matches('/'),
        file_id / 1000,
        file_id % 1000,
        file_name
    )
}

/// Choose the download URL for a file.
///
/// A non-empty catalog-supplied URL is returned unchanged; otherwise the CDN
/// URL is synthesized.
pub fn canonical_url(base: &str, supplied: Option<&str>, file_id: u32, file_name: &str) -> String {
    match supplied {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => build_cdn_url(base, file_id, file_name),
    }
}
