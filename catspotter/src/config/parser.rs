//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [acquisition] section
    if let Some(section) = ini.section(Some("acquisition")) {
        if let Some(v) = section.get("high_accuracy") {
            config.acquisition.high_accuracy = parse_bool(v);
        }
        if let Some(v) = section.get("timeout_ms") {
            config.acquisition.timeout_ms = parse_positive_ms("acquisition", "timeout_ms", v)?;
        }
        if let Some(v) = section.get("max_cached_age_ms") {
            config.acquisition.max_cached_age_ms =
                v.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "acquisition".to_string(),
                    key: "max_cached_age_ms".to_string(),
                    value: v.to_string(),
                    reason: "must be a non-negative integer (milliseconds)".to_string(),
                })?;
        }
    }

    // [environment] section
    if let Some(section) = ini.section(Some("environment")) {
        if let Some(v) = section.get("profile") {
            config.environment.profile = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "environment".to_string(),
                key: "profile".to_string(),
                value: v.to_string(),
                reason: "must be one of: auto, desktop, mobile, ios_safari".to_string(),
            })?;
        }
        if let Some(v) = section.get("user_agent") {
            let v = v.trim();
            if !v.is_empty() {
                config.environment.user_agent = Some(v.to_string());
            }
        }
    }

    // [gpsd] section
    if let Some(section) = ini.section(Some("gpsd")) {
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if v.is_empty() {
                return Err(ConfigFileError::InvalidValue {
                    section: "gpsd".to_string(),
                    key: "host".to_string(),
                    value: v.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            config.gpsd.host = v.to_string();
        }
        if let Some(v) = section.get("port") {
            config.gpsd.port = match v.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => {
                    return Err(ConfigFileError::InvalidValue {
                        section: "gpsd".to_string(),
                        key: "port".to_string(),
                        value: v.to_string(),
                        reason: "must be a port number between 1 and 65535".to_string(),
                    });
                }
            };
        }
        if let Some(v) = section.get("connect_timeout_ms") {
            config.gpsd.connect_timeout_ms = parse_positive_ms("gpsd", "connect_timeout_ms", v)?;
        }
    }

    // [permission] section
    if let Some(section) = ini.section(Some("permission")) {
        if let Some(v) = section.get("provoke_prompt") {
            config.permission.provoke_prompt = parse_bool(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn parse_positive_ms(section: &str, key: &str, value: &str) -> Result<u64, ConfigFileError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a positive integer (milliseconds)".to_string(),
        }),
    }
}

/// Parse a boolean value from INI.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
