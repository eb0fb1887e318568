//! Scriptable in-memory platform.
//!
//! [`ScriptedPlatform`] replays a queue of outcomes for single-shot
//! requests, records every strategy it was asked for, and lets the caller
//! push events into continuous subscriptions by hand. Events are never
//! delivered to a subscription after it has been cancelled.
//!
//! ```
//! use catspotter::location::{
//!     AcquisitionStrategy, LocationPlatform, PlatformFailure, ScriptedOutcome, ScriptedPlatform,
//! };
//!
//! let platform = ScriptedPlatform::new()
//!     .then(ScriptedOutcome::failure(PlatformFailure::timeout("no lock")))
//!     .then(ScriptedOutcome::fix(51.5, -0.12, 30.0));
//! assert_eq!(platform.pending_outcomes(), 2);
//! ```

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::error::PlatformFailure;
use super::platform::{LocationPlatform, PermissionState, PositionSink, SubscriptionId};
use super::reading::PlatformFix;
use super::strategy::AcquisitionStrategy;

/// Timestamp used by [`ScriptedOutcome::fix`].
pub const SCRIPTED_TIMESTAMP_MILLIS: i64 = 1_700_000_000_000;

/// One scripted answer to a single-shot request.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Fix(PlatformFix),
    Failure(PlatformFailure),
    /// Resolve with the inner outcome after a delay.
    Delayed(Duration, Box<ScriptedOutcome>),
    /// Never resolve.
    Hang,
}

impl ScriptedOutcome {
    pub fn fix(latitude: f64, longitude: f64, accuracy_meters: f64) -> Self {
        Self::Fix(PlatformFix {
            latitude,
            longitude,
            accuracy_meters,
            timestamp_millis: SCRIPTED_TIMESTAMP_MILLIS,
        })
    }

    pub fn failure(failure: PlatformFailure) -> Self {
        Self::Failure(failure)
    }

    pub fn after(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }

    async fn resolve(self) -> Result<PlatformFix, PlatformFailure> {
        let mut outcome = self;
        loop {
            match outcome {
                Self::Fix(fix) => return Ok(fix),
                Self::Failure(failure) => return Err(failure),
                Self::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    outcome = *inner;
                }
                Self::Hang => return std::future::pending().await,
            }
        }
    }
}

struct Subscription {
    strategy: AcquisitionStrategy,
    sink: Arc<PositionSink>,
}

/// Platform driven entirely by a script.
pub struct ScriptedPlatform {
    available: bool,
    permission: Option<PermissionState>,
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
    requests: Mutex<Vec<AcquisitionStrategy>>,
    subscriptions: Mutex<HashMap<SubscriptionId, Subscription>>,
    cancelled: Mutex<Vec<SubscriptionId>>,
    next_subscription: AtomicU64,
}

impl ScriptedPlatform {
    /// Available platform with an empty script and no permission introspection.
    pub fn new() -> Self {
        Self {
            available: true,
            permission: None,
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(HashMap::new()),
            cancelled: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Platform without a location capability.
    pub fn unsupported() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Answer permission queries with `state`.
    pub fn with_permission(mut self, state: PermissionState) -> Self {
        self.permission = Some(state);
        self
    }

    /// Append an outcome to the script.
    pub fn then(self, outcome: ScriptedOutcome) -> Self {
        self.push(outcome);
        self
    }

    /// Append an outcome to the script through a shared reference.
    pub fn push(&self, outcome: ScriptedOutcome) {
        self.outcomes.lock().push_back(outcome);
    }

    /// Outcomes not yet consumed.
    pub fn pending_outcomes(&self) -> usize {
        self.outcomes.lock().len()
    }

    /// Strategies of every single-shot request, in call order.
    pub fn requests(&self) -> Vec<AcquisitionStrategy> {
        self.requests.lock().clone()
    }

    /// Number of single-shot requests made.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Ids of subscriptions that are still registered.
    pub fn active_subscriptions(&self) -> Vec<SubscriptionId> {
        let mut ids: Vec<_> = self.subscriptions.lock().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Strategy a subscription was registered with.
    pub fn subscription_strategy(&self, id: SubscriptionId) -> Option<AcquisitionStrategy> {
        self.subscriptions.lock().get(&id).map(|s| s.strategy)
    }

    /// Ids passed to [`LocationPlatform::cancel_subscription`], in call order.
    pub fn cancelled_subscriptions(&self) -> Vec<SubscriptionId> {
        self.cancelled.lock().clone()
    }

    /// Push an event into a subscription.
    ///
    /// Returns false (and delivers nothing) if the subscription is unknown
    /// or cancelled.
    pub fn emit(&self, id: SubscriptionId, event: Result<PlatformFix, PlatformFailure>) -> bool {
        // Release the lock before calling out; sinks may cancel themselves.
        let sink = self
            .subscriptions
            .lock()
            .get(&id)
            .map(|s| Arc::clone(&s.sink));
        match sink {
            Some(sink) => {
                sink(event);
                true
            }
            None => false,
        }
    }
}

impl Default for ScriptedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationPlatform for ScriptedPlatform {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_position(
        &self,
        strategy: AcquisitionStrategy,
    ) -> impl Future<Output = Result<PlatformFix, PlatformFailure>> + Send {
        self.requests.lock().push(strategy);
        let outcome = self.outcomes.lock().pop_front();

        async move {
            match outcome {
                Some(outcome) => outcome.resolve().await,
                None => Err(PlatformFailure::position_unavailable(
                    "script exhausted",
                )),
            }
        }
    }

    fn request_continuous_position(
        &self,
        strategy: AcquisitionStrategy,
        sink: PositionSink,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .lock()
            .insert(
                id,
                Subscription {
                    strategy,
                    sink: Arc::new(sink),
                },
            );
        id
    }

    fn cancel_subscription(&self, id: SubscriptionId) {
        self.subscriptions.lock().remove(&id);
        self.cancelled.lock().push(id);
    }

    fn query_permission(&self) -> impl Future<Output = Option<PermissionState>> + Send {
        let permission = self.permission;
        async move { permission }
    }
}
