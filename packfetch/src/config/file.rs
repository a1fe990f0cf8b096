//! Configuration file handling for ~/.packfetch/config.ini.
//!
//! ```ini
//! [catalog]
//! api_base = https://api.curseforge.com
//! timeout = 30
//! concurrency = 16
//!
//! [install]
//! concurrency = 16
//! max_retries = 3
//! download_timeout = 120
//! verify_existing = true
//! cdn_base = https://edge.forgecdn.net
//! ```
//!
//! The API key is deliberately not read from this file; it comes from the
//! command line or the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::catalog::CatalogConfig;
use crate::installer::InstallerConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// `[catalog]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub api_base: String,
    /// Lookup timeout in seconds.
    pub timeout: u64,
    pub concurrency: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        let defaults = CatalogConfig::default();
        Self {
            api_base: defaults.api_base,
            timeout: defaults.lookup_timeout.as_secs(),
            concurrency: defaults.concurrency,
        }
    }
}

/// `[install]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSettings {
    pub concurrency: usize,
    pub max_retries: u32,
    /// Download timeout in seconds.
    pub download_timeout: u64,
    pub verify_existing: bool,
    pub cdn_base: String,
}

impl Default for InstallSettings {
    fn default() -> Self {
        let defaults = InstallerConfig::default();
        Self {
            concurrency: defaults.concurrency,
            max_retries: defaults.max_retries,
            download_timeout: defaults.download_timeout.as_secs(),
            verify_existing: defaults.verify_existing,
            cdn_base: defaults.cdn_base,
        }
    }
}

/// Settings loaded from the user's config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub catalog: CatalogSettings,
    pub install: InstallSettings,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.packfetch/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(text)
            .map_err(|e| ConfigFileError::ReadError(ini::Error::Parse(e)))?;
        super::parser::parse_ini(&ini)
    }

    /// Catalog client settings, with the API key supplied by the caller.
    pub fn catalog_config(&self, api_key: Option<&str>) -> CatalogConfig {
        let config = CatalogConfig::default()
            .with_api_base(&self.catalog.api_base)
            .with_concurrency(self.catalog.concurrency)
            .with_lookup_timeout(Duration::from_secs(self.catalog.timeout));
        match api_key {
            Some(key) => config.with_api_key(key),
            None => config,
        }
    }

    /// Installer settings.
    pub fn installer_config(&self) -> InstallerConfig {
        InstallerConfig::default()
            .with_concurrency(self.install.concurrency)
            .with_max_retries(self.install.max_retries)
            .with_download_timeout(Duration::from_secs(self.install.download_timeout))
            .with_verify_existing(self.install.verify_existing)
            .with_cdn_base(&self.install.cdn_base)
    }
}

/// Get the path to the config directory (~/.packfetch).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".packfetch")
}

/// Get the path to the config file (~/.packfetch/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
