//! Position readings and accuracy tiers.
//!
//! - [`PlatformFix`] - Raw fix as reported by a [`LocationPlatform`](super::LocationPlatform)
//! - [`PositionReading`] - Validated, immutable acquisition result
//! - [`AccuracyTier`] - Derived precision classification (lower meters = better)

use thiserror::Error;

/// Accuracy at or below which a reading is usable for placing a sighting
/// marker without warning the user.
pub const ACCEPTABLE_ACCURACY_METERS: f64 = 1000.0;

/// Raw position fix reported by a location platform.
///
/// This is the payload of a successful platform callback. It becomes a
/// [`PositionReading`] only after validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformFix {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// 1-sigma horizontal radius in meters.
    pub accuracy_meters: f64,
    /// Platform timestamp of the fix, Unix epoch milliseconds.
    pub timestamp_millis: i64,
}

/// A platform fix that cannot be turned into a reading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidFix {
    #[error("Latitude {0} is outside -90..=90")]
    Latitude(f64),

    #[error("Longitude {0} is outside -180..=180")]
    Longitude(f64),

    #[error("Accuracy {0} is not a finite, non-negative distance")]
    Accuracy(f64),
}

/// Validated position reading.
///
/// Only ever built from a successful platform fix and immutable afterwards.
/// Owned by whoever requested it; nothing in this crate stores readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionReading {
    latitude: f64,
    longitude: f64,
    accuracy_meters: f64,
    captured_at_millis: i64,
}

impl PositionReading {
    /// Latitude in WGS-84 degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in WGS-84 degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Reported accuracy radius in meters.
    #[inline]
    pub fn accuracy_meters(&self) -> f64 {
        self.accuracy_meters
    }

    /// Platform timestamp of the fix, Unix epoch milliseconds.
    #[inline]
    pub fn captured_at_millis(&self) -> i64 {
        self.captured_at_millis
    }

    /// Latitude/longitude pair.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Accuracy tier of this reading (recomputed on every call).
    pub fn tier(&self) -> AccuracyTier {
        AccuracyTier::classify(self.accuracy_meters)
    }

    /// Whether the reading is precise enough to place a marker without warning.
    pub fn is_acceptable(&self) -> bool {
        is_acceptable(self.accuracy_meters)
    }

    /// Capture time as a UTC datetime, if the timestamp is representable.
    pub fn captured_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.captured_at_millis)
    }
}

impl TryFrom<PlatformFix> for PositionReading {
    type Error = InvalidFix;

    fn try_from(fix: PlatformFix) -> Result<Self, Self::Error> {
        if !fix.latitude.is_finite() || !(-90.0..=90.0).contains(&fix.latitude) {
            return Err(InvalidFix::Latitude(fix.latitude));
        }
        if !fix.longitude.is_finite() || !(-180.0..=180.0).contains(&fix.longitude) {
            return Err(InvalidFix::Longitude(fix.longitude));
        }
        if !fix.accuracy_meters.is_finite() || fix.accuracy_meters < 0.0 {
            return Err(InvalidFix::Accuracy(fix.accuracy_meters));
        }

        Ok(Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy_meters: fix.accuracy_meters,
            captured_at_millis: fix.timestamp_millis,
        })
    }
}

/// Precision classification of a reading.
///
/// Ordered from worst to best, so `VeryHigh > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccuracyTier {
    /// More than 1000 m.
    VeryLow,
    /// Up to 1000 m.
    Low,
    /// Up to 100 m.
    Medium,
    /// Up to 20 m.
    High,
    /// Up to 5 m.
    VeryHigh,
}

impl AccuracyTier {
    /// Classify an accuracy radius. Each boundary belongs to the better tier.
    pub fn classify(accuracy_meters: f64) -> Self {
        if accuracy_meters <= 5.0 {
            Self::VeryHigh
        } else if accuracy_meters <= 20.0 {
            Self::High
        } else if accuracy_meters <= 100.0 {
            Self::Medium
        } else if accuracy_meters <= ACCEPTABLE_ACCURACY_METERS {
            Self::Low
        } else {
            // Also catches NaN
            Self::VeryLow
        }
    }

    /// Human-readable confidence label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::VeryLow => "Very Low",
        }
    }
}

impl std::fmt::Display for AccuracyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an accuracy radius into a tier.
pub fn classify(accuracy_meters: f64) -> AccuracyTier {
    AccuracyTier::classify(accuracy_meters)
}

/// True if `accuracy_meters <= 1000`.
pub fn is_acceptable(accuracy_meters: f64) -> bool {
    accuracy_meters <= ACCEPTABLE_ACCURACY_METERS
}
