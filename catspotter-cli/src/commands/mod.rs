//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`classify`] - Accuracy tier lookup
//! - [`config`] - Configuration management (get, list, path, init)
//! - [`locate`] - One-shot "use my location"
//! - [`permission`] - Permission pre-check
//! - [`watch`] - Continuous position updates

pub mod classify;
pub mod config;
pub mod locate;
pub mod permission;
pub mod watch;

use catspotter::location::PositionReading;

/// Lines describing a reading, as printed by `locate` and `watch`.
pub(crate) fn reading_lines(reading: &PositionReading) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Location: {:.6}, {:.6}",
            reading.latitude(),
            reading.longitude()
        ),
        format!(
            "Accuracy: ~{}m ({})",
            reading.accuracy_meters().round() as i64,
            reading.tier()
        ),
    ];
    if let Some(captured_at) = reading.captured_at() {
        lines.push(format!("Captured: {}", captured_at.to_rfc3339()));
    }
    lines
}
