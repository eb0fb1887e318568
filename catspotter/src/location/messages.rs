//! User-facing wording for acquisition outcomes.

use super::error::AcquisitionError;

/// Advisory shown with a successful but imprecise reading.
pub const LOW_ACCURACY_ADVISORY: &str =
    "Location found but accuracy is low. Consider moving to a more open area for better precision.";

/// Human-readable explanation of an acquisition failure.
///
/// iOS Safari gets the Settings path for permission problems, other mobile
/// devices get signal/browser guidance, desktops get short guidance.
pub fn describe_error(error: AcquisitionError, is_mobile: bool, is_ios_safari: bool) -> &'static str {
    match error {
        AcquisitionError::Unsupported => "Geolocation is not supported by your browser.",
        AcquisitionError::PermissionDenied if is_ios_safari => {
            "Location access was denied. On iPhone: Go to Settings > Safari > Location Services and enable location access, then refresh this page."
        }
        AcquisitionError::PermissionDenied if is_mobile => {
            "Location access was denied. Please enable location permissions in your browser settings and refresh the page."
        }
        AcquisitionError::PermissionDenied => {
            "Location access was denied. Please enable location permissions and try again."
        }
        AcquisitionError::PositionUnavailable if is_mobile => {
            "Your location is currently unavailable. Try moving to an area with better GPS signal or use WiFi for location services."
        }
        AcquisitionError::PositionUnavailable => {
            "Your location is currently unavailable. Please try again or select a location manually."
        }
        AcquisitionError::Timeout if is_mobile => {
            "Location request timed out. This can happen indoors or in areas with poor GPS signal. Try moving outside or select a location manually."
        }
        AcquisitionError::Timeout => {
            "Location request timed out. Please try again or select a location manually."
        }
        AcquisitionError::Cancelled => "Location request was cancelled.",
        AcquisitionError::Unknown => {
            "An error occurred while getting your location. Please try again or select a location manually."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AcquisitionError; 6] = [
        AcquisitionError::Unsupported,
        AcquisitionError::PermissionDenied,
        AcquisitionError::PositionUnavailable,
        AcquisitionError::Timeout,
        AcquisitionError::Unknown,
        AcquisitionError::Cancelled,
    ];

    #[test]
    fn test_ios_safari_permission_guidance() {
        let ios = describe_error(AcquisitionError::PermissionDenied, true, true);
        let android = describe_error(AcquisitionError::PermissionDenied, true, false);

        assert!(ios.contains("Settings > Safari > Location Services"));
        assert!(!android.contains("Settings > Safari"));
        assert!(android.contains("browser settings"));
    }

    #[test]
    fn test_desktop_permission_guidance() {
        let desktop = describe_error(AcquisitionError::PermissionDenied, false, false);
        assert!(desktop.ends_with("try again."));
        assert!(!desktop.contains("Safari"));
    }

    #[test]
    fn test_mobile_signal_guidance() {
        assert!(describe_error(AcquisitionError::Timeout, true, false).contains("indoors"));
        assert!(!describe_error(AcquisitionError::Timeout, false, false).contains("indoors"));
        assert!(
            describe_error(AcquisitionError::PositionUnavailable, true, false).contains("GPS signal")
        );
    }

    #[test]
    fn test_platform_independent_messages() {
        for error in [
            AcquisitionError::Unsupported,
            AcquisitionError::Unknown,
            AcquisitionError::Cancelled,
        ] {
            let desktop = describe_error(error, false, false);
            assert_eq!(describe_error(error, true, false), desktop);
            assert_eq!(describe_error(error, true, true), desktop);
        }
    }

    #[test]
    fn test_every_error_has_a_message() {
        for error in ALL {
            for (mobile, ios) in [(false, false), (true, false), (true, true)] {
                assert!(!describe_error(error, mobile, ios).is_empty());
            }
        }
    }
}
