//! User configuration loaded from `~/.packfetch/config.ini`.

mod file;
mod parser;

pub use file::{
    config_directory, config_file_path, CatalogSettings, ConfigFile, ConfigFileError,
    InstallSettings,
};
