//! catspotter - location acquisition for a cat-sighting map
//!
//! This library obtains the user's position so sightings can be placed on
//! the map and the map can be centred on the user. It copes with slow GPS
//! lock, denied permissions, and coarse network positioning, and grades
//! each reading by its accuracy.
//!
//! # High-Level API
//!
//! ```ignore
//! use catspotter::config::ConfigFile;
//! use catspotter::location::{locate_user, GpsdPlatform, LocationAcquisition};
//!
//! let config = ConfigFile::load()?;
//! let acquisition = LocationAcquisition::new(
//!     GpsdPlatform::new(config.gpsd.gpsd_config()),
//!     config.environment.runtime_environment(),
//! );
//!
//! let located = locate_user(&acquisition).await?;
//! println!("{}", located.badge());
//! ```

pub mod config;
pub mod location;
pub mod logging;

/// Version of the catspotter library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
