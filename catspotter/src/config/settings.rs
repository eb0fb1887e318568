//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! Conversions into location types live here; parsing and serialization
//! do not.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::location::{
    AcquisitionStrategy, GpsdConfig, PermissionProbe, RuntimeEnvironment, StaticEnvironment,
    UserAgentEnvironment,
};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Single-shot strategy used by `locate --single`
    pub acquisition: AcquisitionSettings,
    /// Runtime environment classification
    pub environment: EnvironmentSettings,
    /// gpsd connection
    pub gpsd: GpsdSettings,
    /// Permission pre-check behaviour
    pub permission: PermissionSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Strategy for explicit single-shot requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionSettings {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_cached_age_ms: u64,
}

impl AcquisitionSettings {
    pub fn strategy(&self) -> AcquisitionStrategy {
        AcquisitionStrategy::from_millis(self.high_accuracy, self.timeout_ms, self.max_cached_age_ms)
    }
}

/// How the runtime environment is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvironmentProfile {
    /// Classify from `user_agent`; desktop when none is configured.
    #[default]
    Auto,
    Desktop,
    Mobile,
    IosSafari,
}

impl FromStr for EnvironmentProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            "ios_safari" => Ok(Self::IosSafari),
            other => Err(format!("unknown environment profile '{other}'")),
        }
    }
}

impl fmt::Display for EnvironmentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
            Self::IosSafari => "ios_safari",
        })
    }
}

/// Environment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvironmentSettings {
    pub profile: EnvironmentProfile,
    /// User-agent string classified when `profile = auto`
    pub user_agent: Option<String>,
}

impl EnvironmentSettings {
    /// Build the runtime environment this configuration describes.
    pub fn runtime_environment(&self) -> Box<dyn RuntimeEnvironment> {
        match (self.profile, self.user_agent.as_deref()) {
            (EnvironmentProfile::Auto, Some(user_agent)) => {
                Box::new(UserAgentEnvironment::new(user_agent))
            }
            (EnvironmentProfile::Auto, None) | (EnvironmentProfile::Desktop, _) => {
                Box::new(StaticEnvironment::DESKTOP)
            }
            (EnvironmentProfile::Mobile, _) => Box::new(StaticEnvironment::MOBILE),
            (EnvironmentProfile::IosSafari, _) => Box::new(StaticEnvironment::IOS_SAFARI),
        }
    }
}

/// gpsd configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpsdSettings {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
}

impl GpsdSettings {
    pub fn gpsd_config(&self) -> GpsdConfig {
        GpsdConfig::from_config(self.host.clone(), self.port, self.connect_timeout_ms)
    }
}

/// Permission pre-check configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionSettings {
    /// Fall back to a short position request when the platform cannot
    /// introspect permissions. May trigger an OS prompt.
    pub provoke_prompt: bool,
}

impl PermissionSettings {
    pub fn probe(&self) -> PermissionProbe {
        if self.provoke_prompt {
            PermissionProbe::ProvokeRequest
        } else {
            PermissionProbe::IntrospectOnly
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
