//! Error types for the gpsd platform.

use std::io;

use thiserror::Error;

use crate::location::error::PlatformFailure;

/// Errors that can occur while talking to gpsd.
#[derive(Debug, Error)]
pub enum GpsdError {
    /// TCP connect failed.
    #[error("Failed to connect to gpsd at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// TCP connect did not finish within the connect timeout.
    #[error("Timed out connecting to gpsd at {address}")]
    ConnectTimeout { address: String },

    /// Read or write on an established connection failed.
    #[error("gpsd I/O error: {0}")]
    Io(#[from] io::Error),

    /// gpsd closed the connection.
    #[error("gpsd closed the connection")]
    Closed,

    /// No usable fix arrived before the request deadline.
    #[error("No fix from gpsd within {timeout_ms}ms")]
    NoFix { timeout_ms: u128 },
}

impl From<GpsdError> for PlatformFailure {
    fn from(error: GpsdError) -> Self {
        let message = error.to_string();
        match error {
            GpsdError::Connect { source, .. } | GpsdError::Io(source)
                if source.kind() == io::ErrorKind::PermissionDenied =>
            {
                PlatformFailure::permission_denied(message)
            }
            GpsdError::NoFix { .. } => PlatformFailure::timeout(message),
            _ => PlatformFailure::position_unavailable(message),
        }
    }
}
