//! Acquisition strategies.
//!
//! A strategy is the option set for one platform request. The mobile
//! cascade and the desktop request use fixed strategy constants; callers
//! of [`acquire_single`](super::LocationAcquisition::acquire_single) pass
//! their own, usually built from [`StrategyOverrides`].

use std::time::Duration;

/// Default timeout for a single-shot request (slow mobile GPS lock).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Default tolerated age of a platform-cached fix.
pub const DEFAULT_MAX_CACHED_AGE: Duration = Duration::from_millis(60_000);

/// Options for one platform position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionStrategy {
    /// Ask the platform for its most precise source (GPS over WiFi/cell).
    pub high_accuracy: bool,

    /// Deadline for the request; expiry surfaces as `Timeout`.
    pub timeout: Duration,

    /// Oldest platform-cached fix that may be returned instead of a new one.
    pub max_cached_age: Duration,
}

impl AcquisitionStrategy {
    /// Build a strategy from millisecond values.
    pub const fn from_millis(high_accuracy: bool, timeout_ms: u64, max_cached_age_ms: u64) -> Self {
        Self {
            high_accuracy,
            timeout: Duration::from_millis(timeout_ms),
            max_cached_age: Duration::from_millis(max_cached_age_ms),
        }
    }

    /// Timeout in whole milliseconds.
    pub fn timeout_millis(&self) -> u128 {
        self.timeout.as_millis()
    }

    /// Cache tolerance in whole milliseconds.
    pub fn max_cached_age_millis(&self) -> u128 {
        self.max_cached_age.as_millis()
    }

    pub fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_cached_age(mut self, max_cached_age: Duration) -> Self {
        self.max_cached_age = max_cached_age;
        self
    }
}

impl Default for AcquisitionStrategy {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_TIMEOUT,
            max_cached_age: DEFAULT_MAX_CACHED_AGE,
        }
    }
}

/// Strategy used by desktop consumers: high accuracy, 15 s, 60 s cache.
pub const DESKTOP_STRATEGY: AcquisitionStrategy = AcquisitionStrategy::from_millis(true, 15_000, 60_000);

/// The mobile cascade: precise first, then a permissive low-accuracy retry.
pub const MOBILE_STRATEGIES: [AcquisitionStrategy; 2] = [
    AcquisitionStrategy::from_millis(true, 15_000, 60_000),
    AcquisitionStrategy::from_millis(false, 10_000, 300_000),
];

/// Default strategy for continuous watches: high accuracy, 10 s, 60 s cache.
pub const WATCH_STRATEGY: AcquisitionStrategy = AcquisitionStrategy::from_millis(true, 10_000, 60_000);

/// Short request used only to provoke a permission prompt.
pub const PERMISSION_PROBE_STRATEGY: AcquisitionStrategy =
    AcquisitionStrategy::from_millis(true, 1_000, 60_000);

/// Partially specified strategy; omitted fields fall back to a base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategyOverrides {
    pub high_accuracy: Option<bool>,
    pub timeout: Option<Duration>,
    pub max_cached_age: Option<Duration>,
}

impl StrategyOverrides {
    /// Fill omitted fields from [`AcquisitionStrategy::default`].
    pub fn resolve(self) -> AcquisitionStrategy {
        self.resolve_over(AcquisitionStrategy::default())
    }

    /// Fill omitted fields from `base`.
    pub fn resolve_over(self, base: AcquisitionStrategy) -> AcquisitionStrategy {
        AcquisitionStrategy {
            high_accuracy: self.high_accuracy.unwrap_or(base.high_accuracy),
            timeout: self.timeout.unwrap_or(base.timeout),
            max_cached_age: self.max_cached_age.unwrap_or(base.max_cached_age),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy() {
        let strategy = AcquisitionStrategy::default();
        assert!(strategy.high_accuracy);
        assert_eq!(strategy.timeout_millis(), 30_000);
        assert_eq!(strategy.max_cached_age_millis(), 60_000);
    }

    #[test]
    fn test_mobile_cascade_table() {
        let [first, second] = MOBILE_STRATEGIES;

        assert!(first.high_accuracy);
        assert_eq!(first.timeout_millis(), 15_000);
        assert_eq!(first.max_cached_age_millis(), 60_000);

        assert!(!second.high_accuracy);
        assert_eq!(second.timeout_millis(), 10_000);
        assert_eq!(second.max_cached_age_millis(), 300_000);
    }

    #[test]
    fn test_overrides_fill_omitted_fields_with_defaults() {
        let strategy = StrategyOverrides {
            timeout: Some(Duration::from_secs(1)),
            ..Default::default()
        }
        .resolve();

        assert!(strategy.high_accuracy);
        assert_eq!(strategy.timeout, Duration::from_secs(1));
        assert_eq!(strategy.max_cached_age, DEFAULT_MAX_CACHED_AGE);
    }

    #[test]
    fn test_overrides_resolve_over_base() {
        let strategy = StrategyOverrides {
            high_accuracy: Some(false),
            ..Default::default()
        }
        .resolve_over(DESKTOP_STRATEGY);

        assert!(!strategy.high_accuracy);
        assert_eq!(strategy.timeout_millis(), 15_000);
    }

    #[test]
    fn test_builder_methods() {
        let strategy = AcquisitionStrategy::default()
            .with_high_accuracy(false)
            .with_timeout(Duration::from_millis(500))
            .with_max_cached_age(Duration::ZERO);

        assert_eq!(strategy, AcquisitionStrategy::from_millis(false, 500, 0));
    }
}
