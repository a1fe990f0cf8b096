//! Catalog response models.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Class id of bukkit plugins.
pub const CLASS_BUKKIT_PLUGIN: u32 = 5;
/// Class id of mods.
pub const CLASS_MOD: u32 = 6;
/// Class id of resource packs.
pub const CLASS_RESOURCE_PACK: u32 = 12;
/// Class id of worlds.
pub const CLASS_WORLD: u32 = 17;
/// Class id of modpacks.
pub const CLASS_MODPACK: u32 = 4471;
/// Class id of customizations.
pub const CLASS_CUSTOMIZATION: u32 = 4546;
/// Class id of shader packs.
pub const CLASS_SHADER_PACK: u32 = 6552;

/// Envelope wrapping every catalog response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub data: T,
}

/// Metadata for one file of a catalog project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub mod_id: u32,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub file_length: u64,
    #[serde(default, rename = "fileFingerprint")]
    pub fingerprint: u32,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub is_server_pack: bool,
    #[serde(default, rename = "fileDate")]
    pub release_date: Option<DateTime<Utc>>,
}

impl RemoteFile {
    /// Catalog-supplied download URL, if non-empty.
    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Metadata for a catalog project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProject {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub class_id: Option<u32>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub latest_files: Vec<RemoteFile>,
}

impl RemoteProject {
    /// Destination bucket for this project's files.
    pub fn content_class(&self) -> ContentClass {
        self.class_id.map(ContentClass::from_class_id).unwrap_or_default()
    }
}

/// Destination bucket for a downloaded file, derived from the project class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContentClass {
    /// Anything not recognized below lands in `mods/`.
    #[default]
    Mod,
    ResourcePack,
    ShaderPack,
}

impl ContentClass {
    /// Map a catalog class id to a bucket.
    pub fn from_class_id(class_id: u32) -> Self {
        match class_id {
            CLASS_RESOURCE_PACK => Self::ResourcePack,
            CLASS_SHADER_PACK => Self::ShaderPack,
            _ => Self::Mod,
        }
    }

    /// Subdirectory of the install root for this bucket.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Mod => "mods",
            Self::ResourcePack => "resourcepacks",
            Self::ShaderPack => "shaderpacks",
        }
    }
}

impl std::fmt::Display for ContentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.directory())
    }
}
