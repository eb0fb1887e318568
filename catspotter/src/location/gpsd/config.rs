//! Configuration for the gpsd platform.

use std::time::Duration;

/// Default gpsd host.
pub const DEFAULT_GPSD_HOST: &str = "127.0.0.1";

/// Default gpsd port.
pub const DEFAULT_GPSD_PORT: u16 = 2947;

/// Default time allowed for the TCP connect.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Connection settings for a gpsd daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpsdConfig {
    pub host: String,
    pub port: u16,

    /// Bound on the TCP connect alone. The request deadline still applies.
    pub connect_timeout: Duration,
}

impl GpsdConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Create a config from INI settings.
    pub fn from_config(host: String, port: u16, connect_timeout_ms: u64) -> Self {
        Self {
            host,
            port,
            connect_timeout: Duration::from_millis(connect_timeout_ms),
        }
    }

    /// `host:port` string used for connecting and logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for GpsdConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GPSD_HOST.to_string(),
            port: DEFAULT_GPSD_PORT,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}
