//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use catspotter::config::{ConfigFileError, ConfigKeyError};
use catspotter::location::{AcquisitionError, LocationFailure};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// Location could not be acquired
    Location(LocationFailure),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Location(failure) => match failure.error {
                AcquisitionError::PositionUnavailable | AcquisitionError::Timeout => {
                    eprintln!();
                    eprintln!("Common issues:");
                    eprintln!("  1. gpsd not running: systemctl status gpsd");
                    eprintln!("  2. Wrong address: check [gpsd] in 'catspotter config path'");
                    eprintln!("  3. No satellite lock yet: try again outdoors or with --low-accuracy");
                }
                AcquisitionError::PermissionDenied => {
                    eprintln!();
                    eprintln!("Make sure your user may read the GPS device (e.g. the 'dialout' group).");
                }
                _ => {}
            },
            CliError::ConfigFile(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value in the file shown by 'catspotter config path' or");
                eprintln!("regenerate it with 'catspotter config init --force'.");
            }
            _ => {}
        }

        process::exit(exit_code(self))
    }
}

/// Process exit code: 2 for configuration problems, 1 otherwise.
fn exit_code(error: &CliError) -> i32 {
    match error {
        CliError::Config(_) | CliError::ConfigFile(_) => 2,
        _ => 1,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::Location(failure) => write!(f, "{}", failure),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Location(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ConfigKeyError> for CliError {
    fn from(e: ConfigKeyError) -> Self {
        CliError::Config(format!(
            "{}. Use 'catspotter config list' to see available keys.",
            e
        ))
    }
}

impl From<LocationFailure> for CliError {
    fn from(e: LocationFailure) -> Self {
        CliError::Location(e)
    }
}
