//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use super::file::config_directory;
use super::settings::*;
use crate::location::gpsd::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_GPSD_HOST, DEFAULT_GPSD_PORT};

/// Default high-accuracy flag for single-shot requests.
pub const DEFAULT_HIGH_ACCURACY: bool = true;

/// Default single-shot timeout (30 s, slow mobile GPS lock).
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default tolerated age of a cached fix.
pub const DEFAULT_MAX_CACHED_AGE_MS: u64 = 60_000;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "catspotter.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            acquisition: AcquisitionSettings {
                high_accuracy: DEFAULT_HIGH_ACCURACY,
                timeout_ms: DEFAULT_TIMEOUT_MS,
                max_cached_age_ms: DEFAULT_MAX_CACHED_AGE_MS,
            },
            environment: EnvironmentSettings::default(),
            gpsd: GpsdSettings {
                host: DEFAULT_GPSD_HOST.to_string(),
                port: DEFAULT_GPSD_PORT,
                connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            },
            permission: PermissionSettings::default(),
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}
