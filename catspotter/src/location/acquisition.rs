//! Location acquisition policy.
//!
//! [`LocationAcquisition`] turns one [`LocationPlatform`] into a best-effort
//! position source:
//!
//! - `acquire_single` - exactly one platform request, local deadline, no retry
//! - `acquire_mobile` - the two-strategy cascade for slow mobile GPS lock
//! - `acquire` - picks one of the above from the runtime environment
//! - `watch_position` / `clear_watch` - continuous updates
//! - `query_permission_state` - permission pre-check
//!
//! Every call is independent: no shared cache, no request coalescing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::environment::RuntimeEnvironment;
use super::error::AcquisitionError;
use super::messages::describe_error;
use super::platform::{LocationPlatform, PermissionState, PositionSink, SubscriptionId};
use super::reading::{PlatformFix, PositionReading};
use super::strategy::{
    AcquisitionStrategy, DESKTOP_STRATEGY, MOBILE_STRATEGIES, PERMISSION_PROBE_STRATEGY,
};

/// How far a permission pre-check may go when the platform cannot
/// introspect permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionProbe {
    /// Never request a position; answer `Unknown` instead.
    #[default]
    IntrospectOnly,
    /// Issue a short position request to provoke the platform prompt and
    /// infer the state from its outcome. May show an OS permission dialog.
    ProvokeRequest,
}

/// Handle to a continuous position watch.
///
/// Owned by the caller that registered the watch and consumed by
/// [`LocationAcquisition::clear_watch`].
#[must_use = "dropping a WatchHandle leaks the platform subscription"]
#[derive(Debug)]
pub struct WatchHandle {
    id: SubscriptionId,
    gate: Arc<WatchGate>,
}

/// Delivery gate shared by a watch's sink and its handle.
///
/// Callbacks run with `delivery` held, and clearing takes it before closing
/// the gate, so a clear waits for an in-flight callback to finish. The lock
/// is reentrant: a callback may clear its own watch on the delivering thread.
#[derive(Debug)]
struct WatchGate {
    active: AtomicBool,
    delivery: ReentrantMutex<()>,
}

impl WatchGate {
    fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            delivery: ReentrantMutex::new(()),
        }
    }

    fn close(&self) {
        let _delivering = self.delivery.lock();
        self.active.store(false, Ordering::Release);
    }
}

impl WatchHandle {
    /// Platform subscription id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// Acquisition policy over a platform and a runtime environment.
pub struct LocationAcquisition<P, E> {
    platform: P,
    environment: E,
}

impl<P: LocationPlatform, E: RuntimeEnvironment> LocationAcquisition<P, E> {
    pub fn new(platform: P, environment: E) -> Self {
        Self {
            platform,
            environment,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Whether the platform has a location capability at all.
    pub fn is_supported(&self) -> bool {
        self.platform.is_available()
    }

    pub fn is_mobile_device(&self) -> bool {
        self.environment.is_mobile()
    }

    pub fn is_ios_safari_browser(&self) -> bool {
        self.environment.is_ios_safari()
    }

    /// User-facing message for `error` in the current environment.
    pub fn describe_error(&self, error: AcquisitionError) -> &'static str {
        describe_error(
            error,
            self.environment.is_mobile(),
            self.environment.is_ios_safari(),
        )
    }

    /// Request one position with `strategy`.
    ///
    /// The strategy timeout is enforced here as well as passed to the
    /// platform; either expiry surfaces as [`AcquisitionError::Timeout`].
    pub async fn acquire_single(
        &self,
        strategy: AcquisitionStrategy,
    ) -> Result<PositionReading, AcquisitionError> {
        if !self.is_supported() {
            debug!("Location capability unavailable");
            return Err(AcquisitionError::Unsupported);
        }

        debug!(
            high_accuracy = strategy.high_accuracy,
            timeout_ms = strategy.timeout_millis() as u64,
            max_cached_age_ms = strategy.max_cached_age_millis() as u64,
            "Requesting position"
        );

        let request = self.platform.request_position(strategy);
        match tokio::time::timeout(strategy.timeout, request).await {
            Ok(Ok(fix)) => accept_fix(fix),
            Ok(Err(failure)) => {
                let error = AcquisitionError::from(&failure);
                debug!(code = ?failure.code, message = %failure.message, "Position request failed");
                Err(error)
            }
            Err(_) => {
                debug!(
                    timeout_ms = strategy.timeout_millis() as u64,
                    "Position request deadline elapsed"
                );
                Err(AcquisitionError::Timeout)
            }
        }
    }

    /// [`acquire_single`](Self::acquire_single) that resolves
    /// [`AcquisitionError::Cancelled`] as soon as `cancel` fires.
    ///
    /// The in-flight platform request is dropped on cancellation.
    pub async fn acquire_single_cancellable(
        &self,
        strategy: AcquisitionStrategy,
        cancel: &CancellationToken,
    ) -> Result<PositionReading, AcquisitionError> {
        if !self.is_supported() {
            debug!("Location capability unavailable");
            return Err(AcquisitionError::Unsupported);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Position request cancelled");
                Err(AcquisitionError::Cancelled)
            }
            result = self.acquire_single(strategy) => result,
        }
    }

    /// Mobile cascade: high accuracy first, then one low-accuracy retry.
    ///
    /// Permission denial aborts immediately. When both strategies fail the
    /// second strategy's error is returned.
    pub async fn acquire_mobile(&self) -> Result<PositionReading, AcquisitionError> {
        self.run_cascade(&MOBILE_STRATEGIES, None).await
    }

    /// [`acquire_mobile`](Self::acquire_mobile) with cancellation. A
    /// cancelled cascade never starts its next strategy.
    pub async fn acquire_mobile_cancellable(
        &self,
        cancel: &CancellationToken,
    ) -> Result<PositionReading, AcquisitionError> {
        self.run_cascade(&MOBILE_STRATEGIES, Some(cancel)).await
    }

    /// Acquire with the path suited to the environment: the mobile cascade
    /// on mobile devices, one desktop request otherwise.
    pub async fn acquire(&self) -> Result<PositionReading, AcquisitionError> {
        if self.is_mobile_device() {
            self.acquire_mobile().await
        } else {
            self.acquire_single(DESKTOP_STRATEGY).await
        }
    }

    async fn run_cascade(
        &self,
        strategies: &[AcquisitionStrategy],
        cancel: Option<&CancellationToken>,
    ) -> Result<PositionReading, AcquisitionError> {
        if !self.is_supported() {
            debug!("Location capability unavailable");
            return Err(AcquisitionError::Unsupported);
        }

        let mut last_error = AcquisitionError::Unknown;

        for (index, strategy) in strategies.iter().enumerate() {
            let attempt = index + 1;
            debug!(
                attempt,
                high_accuracy = strategy.high_accuracy,
                timeout_ms = strategy.timeout_millis() as u64,
                "Trying location strategy"
            );

            let result = match cancel {
                Some(token) => self.acquire_single_cancellable(*strategy, token).await,
                None => self.acquire_single(*strategy).await,
            };

            match result {
                Ok(reading) => {
                    info!(
                        attempt,
                        accuracy_m = reading.accuracy_meters(),
                        tier = %reading.tier(),
                        "Location strategy succeeded"
                    );
                    return Ok(reading);
                }
                Err(error) if !error.is_retryable() => {
                    info!(attempt, %error, "Location strategy failed, not retrying");
                    return Err(error);
                }
                Err(error) => {
                    debug!(attempt, %error, "Location strategy failed");
                    last_error = error;
                }
            }
        }

        warn!(%last_error, "All location strategies failed");
        Err(last_error)
    }

    /// Start a continuous watch.
    ///
    /// `on_update` receives readings in platform order; `on_error` receives
    /// failures without ending the watch. Neither is called once the handle
    /// has been passed to [`clear_watch`](Self::clear_watch).
    pub fn watch_position<U, F>(
        &self,
        on_update: U,
        on_error: F,
        strategy: AcquisitionStrategy,
    ) -> Result<WatchHandle, AcquisitionError>
    where
        U: Fn(PositionReading) + Send + Sync + 'static,
        F: Fn(AcquisitionError) + Send + Sync + 'static,
    {
        if !self.is_supported() {
            return Err(AcquisitionError::Unsupported);
        }

        let gate = Arc::new(WatchGate::new());
        let sink_gate = Arc::clone(&gate);

        let sink: PositionSink = Box::new(move |event| {
            let _delivering = sink_gate.delivery.lock();
            if !sink_gate.active.load(Ordering::Acquire) {
                return;
            }
            match event {
                Ok(fix) => match accept_fix(fix) {
                    Ok(reading) => on_update(reading),
                    Err(error) => on_error(error),
                },
                Err(failure) => on_error(AcquisitionError::from(&failure)),
            }
        });

        let id = self.platform.request_continuous_position(strategy, sink);
        debug!(subscription = %id, "Position watch started");

        Ok(WatchHandle { id, gate })
    }

    /// Stop a watch. No callback runs after this returns.
    ///
    /// Blocks until a callback running on another thread has returned.
    /// Calling it from inside the watch's own callback is allowed.
    pub fn clear_watch(&self, handle: WatchHandle) {
        handle.gate.close();
        self.platform.cancel_subscription(handle.id);
        debug!(subscription = %handle.id, "Position watch cleared");
    }

    /// Determine the location permission state.
    ///
    /// Platform introspection is used when available and never requests a
    /// position. Otherwise `probe` decides: `IntrospectOnly` answers
    /// `Unknown`, `ProvokeRequest` issues a 1 s request and infers the state
    /// (success is `Granted`, denial is `Denied`, anything else `Prompt`).
    /// The inference is a heuristic, not a guarantee.
    pub async fn query_permission_state(&self, probe: PermissionProbe) -> PermissionState {
        if !self.is_supported() {
            return PermissionState::Unknown;
        }

        if let Some(state) = self.platform.query_permission().await {
            debug!(%state, "Permission state from platform");
            return state;
        }

        match probe {
            PermissionProbe::IntrospectOnly => {
                debug!("Permission introspection unavailable");
                PermissionState::Unknown
            }
            PermissionProbe::ProvokeRequest => {
                debug!("Permission introspection unavailable, probing with a position request");
                match self.acquire_single(PERMISSION_PROBE_STRATEGY).await {
                    Ok(_) => PermissionState::Granted,
                    Err(AcquisitionError::PermissionDenied) => PermissionState::Denied,
                    Err(_) => PermissionState::Prompt,
                }
            }
        }
    }
}

/// Validate a platform fix; invalid fixes count as an unavailable position.
fn accept_fix(fix: PlatformFix) -> Result<PositionReading, AcquisitionError> {
    PositionReading::try_from(fix).map_err(|invalid| {
        warn!(error = %invalid, "Platform returned an invalid fix");
        AcquisitionError::PositionUnavailable
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::environment::StaticEnvironment;
    use crate::location::error::PlatformFailure;
    use crate::location::scripted::{ScriptedOutcome, ScriptedPlatform};
    use crate::location::strategy::WATCH_STRATEGY;
    use crate::location::AccuracyTier;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    fn mobile(platform: ScriptedPlatform) -> LocationAcquisition<ScriptedPlatform, StaticEnvironment> {
        LocationAcquisition::new(platform, StaticEnvironment::MOBILE)
    }

    fn desktop(
        platform: ScriptedPlatform,
    ) -> LocationAcquisition<ScriptedPlatform, StaticEnvironment> {
        LocationAcquisition::new(platform, StaticEnvironment::DESKTOP)
    }

    fn timeouts(acquisition: &LocationAcquisition<ScriptedPlatform, StaticEnvironment>) -> Vec<u128> {
        acquisition
            .platform()
            .requests()
            .iter()
            .map(|s| s.timeout_millis())
            .collect()
    }

    // ------------------------------------------------------------------
    // Unsupported platform
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_unsupported_never_touches_platform() {
        let acquisition = mobile(ScriptedPlatform::unsupported());

        assert!(!acquisition.is_supported());
        assert_eq!(
            acquisition.acquire_single(AcquisitionStrategy::default()).await,
            Err(AcquisitionError::Unsupported)
        );
        assert_eq!(
            acquisition.acquire_mobile().await,
            Err(AcquisitionError::Unsupported)
        );
        assert_eq!(acquisition.acquire().await, Err(AcquisitionError::Unsupported));
        assert_eq!(acquisition.platform().request_count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_wins_over_cancellation() {
        let acquisition = mobile(ScriptedPlatform::unsupported());
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(
            acquisition
                .acquire_single_cancellable(AcquisitionStrategy::default(), &cancel)
                .await,
            Err(AcquisitionError::Unsupported)
        );
        assert_eq!(
            acquisition.acquire_mobile_cancellable(&cancel).await,
            Err(AcquisitionError::Unsupported)
        );
    }

    // ------------------------------------------------------------------
    // Single shot
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_single_success() {
        let acquisition =
            desktop(ScriptedPlatform::new().then(ScriptedOutcome::fix(35.4676, -97.5164, 12.0)));

        let reading = acquisition
            .acquire_single(AcquisitionStrategy::default())
            .await
            .unwrap();

        assert_eq!(reading.coordinates(), (35.4676, -97.5164));
        assert_eq!(reading.tier(), AccuracyTier::High);
        assert!(reading.is_acceptable());
        assert_eq!(
            acquisition.platform().requests(),
            vec![AcquisitionStrategy::default()]
        );
    }

    #[tokio::test]
    async fn test_single_maps_platform_failures() {
        let cases = [
            (
                PlatformFailure::permission_denied("denied"),
                AcquisitionError::PermissionDenied,
            ),
            (
                PlatformFailure::position_unavailable("no fix"),
                AcquisitionError::PositionUnavailable,
            ),
            (PlatformFailure::timeout("slow"), AcquisitionError::Timeout),
            (
                PlatformFailure::new(crate::location::PlatformErrorCode::Other(9), "weird"),
                AcquisitionError::Unknown,
            ),
        ];

        for (failure, expected) in cases {
            let acquisition = desktop(ScriptedPlatform::new().then(ScriptedOutcome::failure(failure)));
            assert_eq!(
                acquisition.acquire_single(AcquisitionStrategy::default()).await,
                Err(expected)
            );
            assert_eq!(acquisition.platform().request_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_single_does_not_retry() {
        let acquisition = desktop(
            ScriptedPlatform::new()
                .then(ScriptedOutcome::failure(PlatformFailure::timeout("slow")))
                .then(ScriptedOutcome::fix(1.0, 1.0, 1.0)),
        );

        assert_eq!(
            acquisition.acquire_single(AcquisitionStrategy::default()).await,
            Err(AcquisitionError::Timeout)
        );
        assert_eq!(acquisition.platform().request_count(), 1);
        assert_eq!(acquisition.platform().pending_outcomes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_enforces_deadline_locally() {
        let acquisition = desktop(ScriptedPlatform::new().then(ScriptedOutcome::Hang));
        let strategy = AcquisitionStrategy::default().with_timeout(Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        let result = acquisition.acquire_single(strategy).await;

        assert_eq!(result, Err(AcquisitionError::Timeout));
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_single_rejects_invalid_fix() {
        let acquisition = desktop(ScriptedPlatform::new().then(ScriptedOutcome::fix(120.0, 0.0, 5.0)));

        assert_eq!(
            acquisition.acquire_single(AcquisitionStrategy::default()).await,
            Err(AcquisitionError::PositionUnavailable)
        );
    }

    #[tokio::test]
    async fn test_single_cancelled_before_start() {
        let acquisition = desktop(ScriptedPlatform::new().then(ScriptedOutcome::fix(1.0, 1.0, 1.0)));
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(
            acquisition
                .acquire_single_cancellable(AcquisitionStrategy::default(), &cancel)
                .await,
            Err(AcquisitionError::Cancelled)
        );
        assert_eq!(acquisition.platform().request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_cancelled_in_flight() {
        let acquisition = desktop(ScriptedPlatform::new().then(ScriptedOutcome::Hang));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        let result = acquisition
            .acquire_single_cancellable(AcquisitionStrategy::default(), &cancel)
            .await;

        assert_eq!(result, Err(AcquisitionError::Cancelled));
        assert!(started.elapsed() < AcquisitionStrategy::default().timeout);
        assert_eq!(acquisition.platform().request_count(), 1);
    }

    // ------------------------------------------------------------------
    // Mobile cascade
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_mobile_first_strategy_success_skips_second() {
        let acquisition = mobile(ScriptedPlatform::new().then(ScriptedOutcome::fix(10.0, 20.0, 4.0)));

        let reading = acquisition.acquire_mobile().await.unwrap();

        assert_eq!(reading.tier(), AccuracyTier::VeryHigh);
        assert_eq!(timeouts(&acquisition), vec![15_000]);
    }

    #[tokio::test]
    async fn test_mobile_timeout_falls_back_to_second_strategy() {
        let acquisition = mobile(
            ScriptedPlatform::new()
                .then(ScriptedOutcome::failure(PlatformFailure::timeout("no lock")))
                .then(ScriptedOutcome::fix(10.0, 20.0, 250.0)),
        );

        let reading = acquisition.acquire_mobile().await.unwrap();

        assert_eq!(reading.accuracy_meters(), 250.0);
        assert_eq!(timeouts(&acquisition), vec![15_000, 10_000]);
        assert_eq!(acquisition.platform().requests(), MOBILE_STRATEGIES.to_vec());
    }

    #[tokio::test]
    async fn test_mobile_permission_denied_aborts() {
        let acquisition = mobile(
            ScriptedPlatform::new()
                .then(ScriptedOutcome::failure(PlatformFailure::permission_denied(
                    "user said no",
                )))
                .then(ScriptedOutcome::fix(10.0, 20.0, 5.0)),
        );

        assert_eq!(
            acquisition.acquire_mobile().await,
            Err(AcquisitionError::PermissionDenied)
        );
        assert_eq!(acquisition.platform().request_count(), 1);
    }

    #[tokio::test]
    async fn test_mobile_propagates_second_error() {
        let acquisition = mobile(
            ScriptedPlatform::new()
                .then(ScriptedOutcome::failure(PlatformFailure::position_unavailable(
                    "indoors",
                )))
                .then(ScriptedOutcome::failure(PlatformFailure::new(
                    crate::location::PlatformErrorCode::Other(99),
                    "driver crashed",
                ))),
        );

        assert_eq!(acquisition.acquire_mobile().await, Err(AcquisitionError::Unknown));
        assert_eq!(acquisition.platform().request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mobile_local_deadline_triggers_fallback() {
        let acquisition = mobile(
            ScriptedPlatform::new()
                .then(ScriptedOutcome::Hang)
                .then(ScriptedOutcome::fix(1.0, 2.0, 40.0)),
        );

        let started = tokio::time::Instant::now();
        let reading = acquisition.acquire_mobile().await.unwrap();

        assert_eq!(reading.accuracy_meters(), 40.0);
        assert!(started.elapsed() >= Duration::from_millis(15_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mobile_second_strategy_waits_for_first() {
        let acquisition = Arc::new(mobile(
            ScriptedPlatform::new()
                .then(
                    ScriptedOutcome::failure(PlatformFailure::timeout("slow"))
                        .after(Duration::from_secs(3)),
                )
                .then(ScriptedOutcome::fix(1.0, 2.0, 40.0)),
        ));

        let task = {
            let acquisition = Arc::clone(&acquisition);
            tokio::spawn(async move { acquisition.acquire_mobile().await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(acquisition.platform().request_count(), 1);

        assert!(task.await.unwrap().is_ok());
        assert_eq!(timeouts(&acquisition), vec![15_000, 10_000]);
    }

    #[tokio::test]
    async fn test_mobile_cancelled_does_not_retry() {
        let acquisition = mobile(ScriptedPlatform::new().then(ScriptedOutcome::fix(1.0, 2.0, 3.0)));
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(
            acquisition.acquire_mobile_cancellable(&cancel).await,
            Err(AcquisitionError::Cancelled)
        );
        assert_eq!(acquisition.platform().request_count(), 0);
    }

    #[tokio::test]
    async fn test_acquire_picks_path_from_environment() {
        let fail_then_fix = || {
            ScriptedPlatform::new()
                .then(ScriptedOutcome::failure(PlatformFailure::timeout("slow")))
                .then(ScriptedOutcome::fix(1.0, 2.0, 3.0))
        };

        let on_mobile = mobile(fail_then_fix());
        assert!(on_mobile.acquire().await.is_ok());
        assert_eq!(timeouts(&on_mobile), vec![15_000, 10_000]);

        let on_desktop = desktop(fail_then_fix());
        assert_eq!(on_desktop.acquire().await, Err(AcquisitionError::Timeout));
        assert_eq!(on_desktop.platform().requests(), vec![DESKTOP_STRATEGY]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquisitions_are_independent() {
        let acquisition = desktop(
            ScriptedPlatform::new()
                .then(ScriptedOutcome::fix(1.0, 1.0, 10.0).after(Duration::from_secs(2)))
                .then(ScriptedOutcome::fix(2.0, 2.0, 20.0).after(Duration::from_secs(1))),
        );

        let (first, second) = tokio::join!(
            acquisition.acquire_single(AcquisitionStrategy::default()),
            acquisition.acquire_single(AcquisitionStrategy::default()),
        );

        assert_eq!(first.unwrap().latitude(), 1.0);
        assert_eq!(second.unwrap().latitude(), 2.0);
        assert_eq!(acquisition.platform().request_count(), 2);
    }

    // ------------------------------------------------------------------
    // Watch
    // ------------------------------------------------------------------

    #[test]
    fn test_watch_then_immediate_clear_delivers_nothing() {
        let acquisition = mobile(ScriptedPlatform::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (updates, errors) = (Arc::clone(&calls), Arc::clone(&calls));

        let handle = acquisition
            .watch_position(
                move |_| {
                    updates.fetch_add(1, Ordering::SeqCst);
                },
                move |_| {
                    errors.fetch_add(1, Ordering::SeqCst);
                },
                WATCH_STRATEGY,
            )
            .unwrap();
        let id = handle.id();

        acquisition.clear_watch(handle);

        assert!(!acquisition
            .platform()
            .emit(id, Err(PlatformFailure::timeout("late"))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(acquisition.platform().cancelled_subscriptions(), vec![id]);
    }

    #[test]
    fn test_watch_delivers_in_platform_order_and_survives_errors() {
        let acquisition = mobile(ScriptedPlatform::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (updates, errors) = (Arc::clone(&seen), Arc::clone(&seen));

        let handle = acquisition
            .watch_position(
                move |reading| updates.lock().unwrap().push(Ok(reading.latitude())),
                move |error| errors.lock().unwrap().push(Err(error)),
                WATCH_STRATEGY,
            )
            .unwrap();
        let id = handle.id();
        let platform = acquisition.platform();

        assert_eq!(platform.subscription_strategy(id), Some(WATCH_STRATEGY));

        let fix = |lat| {
            Ok(crate::location::PlatformFix {
                latitude: lat,
                longitude: 0.0,
                accuracy_meters: 5.0,
                timestamp_millis: 0,
            })
        };
        platform.emit(id, fix(1.0));
        platform.emit(id, Err(PlatformFailure::timeout("gap")));
        platform.emit(id, fix(2.0));
        platform.emit(id, fix(95.0));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Ok(1.0),
                Err(AcquisitionError::Timeout),
                Ok(2.0),
                Err(AcquisitionError::PositionUnavailable),
            ]
        );

        acquisition.clear_watch(handle);
        platform.emit(id, fix(3.0));
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_clear_watch_waits_for_running_callback() {
        let acquisition = Arc::new(mobile(ScriptedPlatform::new()));
        let running = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicUsize::new(0));
        let (cb_running, cb_finished) = (Arc::clone(&running), Arc::clone(&finished));

        let handle = acquisition
            .watch_position(
                move |_| {
                    cb_running.store(true, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(100));
                    cb_finished.fetch_add(1, Ordering::SeqCst);
                },
                |_| {},
                WATCH_STRATEGY,
            )
            .unwrap();
        let id = handle.id();

        let emitter = {
            let acquisition = Arc::clone(&acquisition);
            std::thread::spawn(move || {
                acquisition.platform().emit(
                    id,
                    Ok(crate::location::PlatformFix {
                        latitude: 1.0,
                        longitude: 1.0,
                        accuracy_meters: 5.0,
                        timestamp_millis: 0,
                    }),
                )
            })
        };
        while !running.load(Ordering::SeqCst) {
            std::thread::yield_now();
        }

        acquisition.clear_watch(handle);

        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert!(emitter.join().unwrap());
    }

    #[test]
    fn test_callback_may_clear_its_own_watch() {
        let acquisition = Arc::new(mobile(ScriptedPlatform::new()));
        let slot: Arc<Mutex<Option<WatchHandle>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));

        let handle = {
            let acquisition_in_cb = Arc::clone(&acquisition);
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            acquisition
                .watch_position(
                    move |_| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        if let Some(handle) = slot.lock().unwrap().take() {
                            acquisition_in_cb.clear_watch(handle);
                        }
                    },
                    |_| {},
                    WATCH_STRATEGY,
                )
                .unwrap()
        };
        let id = handle.id();
        *slot.lock().unwrap() = Some(handle);

        let fix = || {
            Ok(crate::location::PlatformFix {
                latitude: 1.0,
                longitude: 1.0,
                accuracy_meters: 5.0,
                timestamp_millis: 0,
            })
        };
        assert!(acquisition.platform().emit(id, fix()));
        assert!(!acquisition.platform().emit(id, fix()));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(acquisition.platform().cancelled_subscriptions(), vec![id]);
    }

    #[test]
    fn test_watch_unsupported() {
        let acquisition = mobile(ScriptedPlatform::unsupported());
        let result = acquisition.watch_position(|_| {}, |_| {}, WATCH_STRATEGY);

        assert!(matches!(result, Err(AcquisitionError::Unsupported)));
        assert!(acquisition.platform().active_subscriptions().is_empty());
    }

    // ------------------------------------------------------------------
    // Permission pre-check
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_permission_from_introspection_makes_no_request() {
        let acquisition =
            desktop(ScriptedPlatform::new().with_permission(PermissionState::Denied));

        assert_eq!(
            acquisition
                .query_permission_state(PermissionProbe::ProvokeRequest)
                .await,
            PermissionState::Denied
        );
        assert_eq!(acquisition.platform().request_count(), 0);
    }

    #[tokio::test]
    async fn test_permission_introspect_only_is_unknown() {
        let acquisition = desktop(ScriptedPlatform::new());

        assert_eq!(
            acquisition
                .query_permission_state(PermissionProbe::IntrospectOnly)
                .await,
            PermissionState::Unknown
        );
        assert_eq!(acquisition.platform().request_count(), 0);
    }

    /// The provoking fallback is a heuristic: it only reports what a short
    /// request happened to return, not the platform's real prompt state.
    #[tokio::test]
    async fn test_permission_provoke_request_heuristic() {
        let cases = [
            (ScriptedOutcome::fix(1.0, 1.0, 1.0), PermissionState::Granted),
            (
                ScriptedOutcome::failure(PlatformFailure::permission_denied("no")),
                PermissionState::Denied,
            ),
            (
                ScriptedOutcome::failure(PlatformFailure::timeout("prompt still open")),
                PermissionState::Prompt,
            ),
        ];

        for (outcome, expected) in cases {
            let acquisition = desktop(ScriptedPlatform::new().then(outcome));
            assert_eq!(
                acquisition
                    .query_permission_state(PermissionProbe::ProvokeRequest)
                    .await,
                expected
            );
            assert_eq!(
                acquisition.platform().requests(),
                vec![PERMISSION_PROBE_STRATEGY]
            );
        }
    }

    #[tokio::test]
    async fn test_permission_unsupported_is_unknown() {
        let acquisition = desktop(
            ScriptedPlatform::unsupported().with_permission(PermissionState::Granted),
        );
        assert_eq!(
            acquisition
                .query_permission_state(PermissionProbe::ProvokeRequest)
                .await,
            PermissionState::Unknown
        );
    }

    #[test]
    fn test_describe_error_uses_environment() {
        let ios = LocationAcquisition::new(ScriptedPlatform::new(), StaticEnvironment::IOS_SAFARI);
        assert!(ios.is_mobile_device());
        assert!(ios.is_ios_safari_browser());
        assert!(ios
            .describe_error(AcquisitionError::PermissionDenied)
            .contains("Settings > Safari"));

        let android = mobile(ScriptedPlatform::new());
        assert!(!android
            .describe_error(AcquisitionError::PermissionDenied)
            .contains("Settings > Safari"));
    }
}
