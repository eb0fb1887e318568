//! The platform location capability.
//!
//! [`LocationPlatform`] is the only seam between acquisition policy and
//! the outside world. Production code uses [`GpsdPlatform`](super::GpsdPlatform);
//! tests use [`ScriptedPlatform`](super::ScriptedPlatform).

use std::future::Future;

use super::error::PlatformFailure;
use super::reading::PlatformFix;
use super::strategy::AcquisitionStrategy;

/// Callback receiving every event of a continuous subscription.
pub type PositionSink = Box<dyn Fn(Result<PlatformFix, PlatformFailure>) + Send + Sync>;

/// Identifier of a continuous subscription issued by a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location permission state as seen by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionState {
    Granted,
    Denied,
    /// The platform will ask the user on the next request.
    Prompt,
    /// The state could not be determined.
    Unknown,
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
            Self::Prompt => write!(f, "prompt"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Platform location capability.
///
/// Implementations must tolerate concurrent requests; acquisition code
/// does not serialize access.
pub trait LocationPlatform: Send + Sync {
    /// Whether the platform exposes a location capability at all.
    fn is_available(&self) -> bool;

    /// Single-shot position request.
    fn request_position(
        &self,
        strategy: AcquisitionStrategy,
    ) -> impl Future<Output = Result<PlatformFix, PlatformFailure>> + Send;

    /// Start a continuous subscription delivering events to `sink` in
    /// platform order until cancelled.
    fn request_continuous_position(
        &self,
        strategy: AcquisitionStrategy,
        sink: PositionSink,
    ) -> SubscriptionId;

    /// Cancel a continuous subscription. Unknown ids are ignored.
    fn cancel_subscription(&self, id: SubscriptionId);

    /// Query the permission state without requesting a position.
    ///
    /// `None` means the platform has no permission introspection.
    fn query_permission(&self) -> impl Future<Output = Option<PermissionState>> + Send {
        async { None }
    }
}
