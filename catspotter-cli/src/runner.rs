//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, and construction of
//! the location acquisition stack shared by the location commands.

use catspotter::config::ConfigFile;
use catspotter::location::{GpsdPlatform, LocationAcquisition, RuntimeEnvironment};
use catspotter::logging::{init_logging, split_log_path, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Acquisition stack used by the CLI.
pub type CliAcquisition = LocationAcquisition<GpsdPlatform, Box<dyn RuntimeEnvironment>>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - Debug-level logging, mirrored to stdout
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let (log_dir, log_file) = split_log_path(&config.logging.file).ok_or_else(|| {
            CliError::Config(format!(
                "logging.file '{}' is not a file path",
                config.logging.file.display()
            ))
        })?;

        let logging_guard = init_logging(&log_dir, &log_file, debug_mode, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("catspotter v{}", catspotter::VERSION);
        info!(
            command,
            gpsd = %self.config.gpsd.gpsd_config().address(),
            profile = %self.config.environment.profile,
            "catspotter CLI started"
        );
    }

    /// Build the acquisition stack from the loaded configuration.
    pub fn acquisition(&self) -> CliAcquisition {
        LocationAcquisition::new(
            GpsdPlatform::new(self.config.gpsd.gpsd_config()),
            self.config.environment.runtime_environment(),
        )
    }
}
