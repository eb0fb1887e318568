//! Configuration for catspotter.
//!
//! User settings live in an INI file at `~/.catspotter/config.ini`:
//!
//! - `[acquisition]` - strategy for explicit single-shot requests
//! - `[environment]` - how the runtime is classified (desktop / mobile / iOS Safari)
//! - `[gpsd]` - gpsd daemon address
//! - `[permission]` - whether permission pre-checks may provoke a prompt
//! - `[logging]` - log file location
//!
//! # Example
//!
//! ```no_run
//! use catspotter::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let strategy = config.acquisition.strategy();
//! let gpsd = config.gpsd.gpsd_config();
//! # Ok::<(), catspotter::config::ConfigFileError>(())
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    DEFAULT_HIGH_ACCURACY, DEFAULT_LOG_FILE_NAME, DEFAULT_MAX_CACHED_AGE_MS, DEFAULT_TIMEOUT_MS,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{
    AcquisitionSettings, ConfigFile, EnvironmentProfile, EnvironmentSettings, GpsdSettings,
    LoggingSettings, PermissionSettings,
};
