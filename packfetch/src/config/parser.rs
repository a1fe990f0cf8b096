//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::{ConfigFile, ConfigFileError};

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a strictly positive integer.
fn positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(invalid(section, key, value, "must be a positive integer")),
    }
}

fn boolean(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn http_url(section: &str, key: &str, value: &str) -> Result<String, ConfigFileError> {
    let v = value.trim();
    if v.starts_with("http://") || v.starts_with("https://") {
        Ok(v.trim_end_matches('/').to_string())
    } else {
        Err(invalid(section, key, value, "must be an http:// or https:// URL"))
    }
}

fn get<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).filter(|v| !v.trim().is_empty())
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
/// Empty values keep the default.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [catalog] section
    if let Some(section) = ini.section(Some("catalog")) {
        if let Some(v) = get(section, "api_base") {
            config.catalog.api_base = http_url("catalog", "api_base", v)?;
        }
        if let Some(v) = get(section, "timeout") {
            config.catalog.timeout = positive("catalog", "timeout", v)?;
        }
        if let Some(v) = get(section, "concurrency") {
            config.catalog.concurrency = positive("catalog", "concurrency", v)?;
        }
    }

    // [install] section
    if let Some(section) = ini.section(Some("install")) {
        if let Some(v) = get(section, "concurrency") {
            config.install.concurrency = positive("install", "concurrency", v)?;
        }
        if let Some(v) = get(section, "max_retries") {
            config.install.max_retries = positive("install", "max_retries", v)?;
        }
        if let Some(v) = get(section, "download_timeout") {
            config.install.download_timeout = positive("install", "download_timeout", v)?;
        }
        if let Some(v) = get(section, "verify_existing") {
            config.install.verify_existing = boolean("install", "verify_existing", v)?;
        }
        if let Some(v) = get(section, "cdn_base") {
            config.install.cdn_base = http_url("install", "cdn_base", v)?;
        }
    }

    Ok(config)
}
