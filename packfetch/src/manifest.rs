//! Pack manifest model.
//!
//! The manifest is the JSON document at the root of a pack archive. It lists
//! every catalog file the pack needs as a `(projectID, fileID)` pair; file
//! names and URLs are usually absent and are filled in during resolution.

use serde::{Deserialize, Serialize};

/// Default value of `manifestType`.
pub const DEFAULT_MANIFEST_TYPE: &str = "minecraftModpack";

/// Default overrides directory inside the archive.
pub const DEFAULT_OVERRIDES: &str = "overrides";

fn default_manifest_type() -> String {
    DEFAULT_MANIFEST_TYPE.to_string()
}

fn default_manifest_version() -> u32 {
    1
}

fn default_overrides() -> String {
    DEFAULT_OVERRIDES.to_string()
}

fn default_required() -> bool {
    true
}

/// A mod loader declared by the pack (e.g. `forge-47.2.0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModLoader {
    pub id: String,
    #[serde(default)]
    pub primary: bool,
}

/// Game version and loaders section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinecraftInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub mod_loaders: Vec<ModLoader>,
}

/// One catalog file the pack installs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "projectID")]
    pub project_id: u32,
    #[serde(rename = "fileID")]
    pub file_id: u32,
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl ManifestEntry {
    /// Create an unresolved entry.
    pub fn new(project_id: u32, file_id: u32) -> Self {
        Self {
            project_id,
            file_id,
            file_name: None,
            url: None,
            required: true,
        }
    }

    /// Attach a resolved file name and URL.
    pub fn with_resolution(mut self, file_name: impl Into<String>, url: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self.url = Some(url.into());
        self
    }

    /// Returns the file name when it is present and non-empty.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns the URL when it is present and non-empty.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether both the file name and URL are known.
    pub fn is_resolved(&self) -> bool {
        self.file_name().is_some() && self.url().is_some()
    }
}

/// Top-level pack manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default = "default_manifest_type")]
    pub manifest_type: String,
    #[serde(default = "default_manifest_version")]
    pub manifest_version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_overrides")]
    pub overrides: String,
    #[serde(default)]
    pub minecraft: MinecraftInfo,
    #[serde(rename = "files", default)]
    pub entries: Vec<ManifestEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            manifest_type: default_manifest_type(),
            manifest_version: default_manifest_version(),
            name: String::new(),
            version: String::new(),
            author: String::new(),
            overrides: default_overrides(),
            minecraft: MinecraftInfo::default(),
            entries: Vec::new(),
        }
    }
}

impl Manifest {
    /// Parse a manifest from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Game version the pack targets.
    pub fn minecraft_version(&self) -> &str {
        &self.minecraft.version
    }

    /// Declared loaders.
    pub fn loaders(&self) -> &[ModLoader] {
        &self.minecraft.mod_loaders
    }

    /// The loader flagged primary, or the first one.
    pub fn primary_loader(&self) -> Option<&ModLoader> {
        self.loaders()
            .iter()
            .find(|l| l.primary)
            .or_else(|| self.loaders().first())
    }

    /// Copy of this manifest's metadata with a different entry list.
    pub fn with_entries(&self, entries: Vec<ManifestEntry>) -> Self {
        Self {
            entries,
            ..self.clone()
        }
    }
}
