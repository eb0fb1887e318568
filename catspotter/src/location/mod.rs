//! Location Acquisition Module
//!
//! Obtains the user's geographic position for placing cat sightings on the
//! map, on top of whatever positioning capability the host platform offers.
//!
//! # Architecture
//!
//! The module never talks to hardware directly. A [`LocationPlatform`]
//! provides single-shot requests, continuous subscriptions, and (optionally)
//! permission introspection. [`LocationAcquisition`] layers the policy on
//! top:
//!
//! - **Desktop** → one high-accuracy request (15 s, 60 s cache)
//! - **Mobile** → high-accuracy request, then a permissive low-accuracy
//!   retry if the first fails for a retryable reason
//! - **Watch** → continuous updates until the handle is cleared
//!
//! Raw fixes are validated into [`PositionReading`]s and graded into
//! [`AccuracyTier`]s. Readings worse than 1000 m are still successes; the
//! caller decides whether to show [`LOW_ACCURACY_ADVISORY`].
//!
//! # Usage
//!
//! ```ignore
//! use catspotter::location::{
//!     locate_user, GpsdConfig, GpsdPlatform, LocationAcquisition, UserAgentEnvironment,
//! };
//!
//! let acquisition = LocationAcquisition::new(
//!     GpsdPlatform::new(GpsdConfig::default()),
//!     UserAgentEnvironment::new(user_agent),
//! );
//!
//! match locate_user(&acquisition).await {
//!     Ok(located) => println!("{}", located.badge()),
//!     Err(failure) => eprintln!("{failure}"),
//! }
//! ```
//!
//! # Components
//!
//! - [`reading`] types - `PositionReading`, `AccuracyTier`, `PlatformFix`
//! - [`strategy`] types - `AcquisitionStrategy` and the fixed strategy table
//! - [`LocationPlatform`] - the platform seam, with [`GpsdPlatform`] and
//!   [`ScriptedPlatform`] implementations
//! - [`RuntimeEnvironment`] - mobile / iOS Safari classification
//! - [`describe_error`] - user-facing failure text
//! - [`locate_user`] - the "use my location" flow

mod acquisition;
mod environment;
mod error;
pub mod gpsd;
mod locator;
mod messages;
mod platform;
mod reading;
mod scripted;
mod strategy;

pub use acquisition::{LocationAcquisition, PermissionProbe, WatchHandle};
pub use environment::{RuntimeEnvironment, StaticEnvironment, UserAgentEnvironment};
pub use error::{AcquisitionError, PlatformErrorCode, PlatformFailure};
pub use gpsd::{GpsdConfig, GpsdError, GpsdPlatform};
pub use locator::{locate_user, LocatedPosition, LocationFailure};
pub use messages::{describe_error, LOW_ACCURACY_ADVISORY};
pub use platform::{LocationPlatform, PermissionState, PositionSink, SubscriptionId};
pub use reading::{
    classify, is_acceptable, AccuracyTier, InvalidFix, PlatformFix, PositionReading,
    ACCEPTABLE_ACCURACY_METERS,
};
pub use scripted::{ScriptedOutcome, ScriptedPlatform, SCRIPTED_TIMESTAMP_MILLIS};
pub use strategy::{
    AcquisitionStrategy, StrategyOverrides, DEFAULT_MAX_CACHED_AGE, DEFAULT_TIMEOUT,
    DESKTOP_STRATEGY, MOBILE_STRATEGIES, PERMISSION_PROBE_STRATEGY, WATCH_STRATEGY,
};
