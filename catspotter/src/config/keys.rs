//! Configuration key access.
//!
//! Maps `section.key` names to fields of [`ConfigFile`] for the CLI's
//! `config get` and `config list` commands.

use std::str::FromStr;
use thiserror::Error;

use super::settings::ConfigFile;

/// Errors that can occur when looking up configuration keys.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    AcquisitionHighAccuracy,
    AcquisitionTimeoutMs,
    AcquisitionMaxCachedAgeMs,

    EnvironmentProfile,
    EnvironmentUserAgent,

    GpsdHost,
    GpsdPort,
    GpsdConnectTimeoutMs,

    PermissionProvokePrompt,

    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == name)
            .ok_or(ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Full key name in `section.key` format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AcquisitionHighAccuracy => "acquisition.high_accuracy",
            Self::AcquisitionTimeoutMs => "acquisition.timeout_ms",
            Self::AcquisitionMaxCachedAgeMs => "acquisition.max_cached_age_ms",
            Self::EnvironmentProfile => "environment.profile",
            Self::EnvironmentUserAgent => "environment.user_agent",
            Self::GpsdHost => "gpsd.host",
            Self::GpsdPort => "gpsd.port",
            Self::GpsdConnectTimeoutMs => "gpsd.connect_timeout_ms",
            Self::PermissionProvokePrompt => "permission.provoke_prompt",
            Self::LoggingFile => "logging.file",
        }
    }

    pub fn section(&self) -> &'static str {
        self.name().split_once('.').map(|(s, _)| s).unwrap_or("")
    }

    pub fn key_name(&self) -> &'static str {
        self.name().split_once('.').map(|(_, k)| k).unwrap_or("")
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::AcquisitionHighAccuracy => config.acquisition.high_accuracy.to_string(),
            Self::AcquisitionTimeoutMs => config.acquisition.timeout_ms.to_string(),
            Self::AcquisitionMaxCachedAgeMs => config.acquisition.max_cached_age_ms.to_string(),
            Self::EnvironmentProfile => config.environment.profile.to_string(),
            Self::EnvironmentUserAgent => {
                config.environment.user_agent.clone().unwrap_or_default()
            }
            Self::GpsdHost => config.gpsd.host.clone(),
            Self::GpsdPort => config.gpsd.port.to_string(),
            Self::GpsdConnectTimeoutMs => config.gpsd.connect_timeout_ms.to_string(),
            Self::PermissionProvokePrompt => config.permission.provoke_prompt.to_string(),
            Self::LoggingFile => config.logging.file.display().to_string(),
        }
    }

    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::AcquisitionHighAccuracy,
            Self::AcquisitionTimeoutMs,
            Self::AcquisitionMaxCachedAgeMs,
            Self::EnvironmentProfile,
            Self::EnvironmentUserAgent,
            Self::GpsdHost,
            Self::GpsdPort,
            Self::GpsdConnectTimeoutMs,
            Self::PermissionProvokePrompt,
            Self::LoggingFile,
        ]
    }
}
