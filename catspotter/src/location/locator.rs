//! "Use my location" flow shared by the map view and the report form.
//!
//! Wraps [`LocationAcquisition`] with the pre-checks and result shaping
//! those consumers need: fail fast on a known-denied permission, pick the
//! mobile or desktop path, and attach accuracy badge / advisory text.

use tracing::{debug, info};

use super::acquisition::LocationAcquisition;
use super::environment::RuntimeEnvironment;
use super::error::AcquisitionError;
use super::messages::LOW_ACCURACY_ADVISORY;
use super::platform::{LocationPlatform, PermissionState};
use super::reading::{AccuracyTier, PositionReading};

/// A located user, ready to centre a map or fill a form field.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedPosition {
    pub reading: PositionReading,
    pub tier: AccuracyTier,
    /// Warning to show next to an imprecise but usable position.
    pub advisory: Option<&'static str>,
}

impl LocatedPosition {
    fn new(reading: PositionReading) -> Self {
        let advisory = (!reading.is_acceptable()).then_some(LOW_ACCURACY_ADVISORY);
        Self {
            tier: reading.tier(),
            reading,
            advisory,
        }
    }

    /// Badge text, e.g. `GPS accuracy: ~12m (High)`.
    pub fn badge(&self) -> String {
        format!(
            "GPS accuracy: ~{}m ({})",
            self.reading.accuracy_meters().round() as i64,
            self.tier
        )
    }
}

/// A failed "use my location" attempt with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFailure {
    pub error: AcquisitionError,
    pub message: &'static str,
}

impl std::fmt::Display for LocationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for LocationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Locate the user for placing a sighting.
///
/// A permission state of `Denied` reported by platform introspection ends
/// the attempt without requesting a position. Introspection never
/// provokes a prompt here.
pub async fn locate_user<P, E>(
    acquisition: &LocationAcquisition<P, E>,
) -> Result<LocatedPosition, LocationFailure>
where
    P: LocationPlatform,
    E: RuntimeEnvironment,
{
    let fail = |error| LocationFailure {
        error,
        message: acquisition.describe_error(error),
    };

    if !acquisition.is_supported() {
        return Err(fail(AcquisitionError::Unsupported));
    }

    debug!(
        mobile = acquisition.is_mobile_device(),
        ios_safari = acquisition.is_ios_safari_browser(),
        "Locating user"
    );

    if acquisition.platform().query_permission().await == Some(PermissionState::Denied) {
        info!("Location permission already denied, not requesting a position");
        return Err(fail(AcquisitionError::PermissionDenied));
    }

    let located = acquisition.acquire().await.map(LocatedPosition::new).map_err(fail)?;

    info!(
        lat = format!("{:.5}", located.reading.latitude()),
        lon = format!("{:.5}", located.reading.longitude()),
        accuracy_m = located.reading.accuracy_meters(),
        tier = %located.tier,
        "User located"
    );

    Ok(located)
}
