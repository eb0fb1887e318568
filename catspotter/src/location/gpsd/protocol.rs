//! gpsd JSON protocol parsing.
//!
//! gpsd streams one JSON object per line once watching is enabled. Only
//! the reports needed for positioning are decoded:
//! - **VERSION** - greeting sent on connect
//! - **TPV** - time/position/velocity report
//! - **ERROR** - daemon-side error
//!
//! Everything else (DEVICES, WATCH, SKY, ...) decodes to [`Report::Other`].

use serde::Deserialize;
use tracing::trace;

use crate::location::reading::PlatformFix;

/// Command enabling JSON watch mode.
pub const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";

/// TPV mode for a 2-D fix.
pub const MODE_2D: u8 = 2;

/// TPV mode for a 3-D fix.
pub const MODE_3D: u8 = 3;

/// A decoded gpsd report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "class")]
pub enum Report {
    #[serde(rename = "VERSION")]
    Version {
        release: String,
        #[serde(default)]
        proto_major: u32,
        #[serde(default)]
        proto_minor: u32,
    },

    #[serde(rename = "TPV")]
    Tpv(Tpv),

    #[serde(rename = "ERROR")]
    Error { message: String },

    #[serde(other)]
    Other,
}

/// Time-position-velocity report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tpv {
    #[serde(default)]
    pub device: Option<String>,
    /// 0 = unknown, 1 = no fix, 2 = 2-D, 3 = 3-D.
    #[serde(default)]
    pub mode: u8,
    pub time: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Estimated horizontal position error, meters.
    pub eph: Option<f64>,
    /// Longitude error estimate, meters.
    pub epx: Option<f64>,
    /// Latitude error estimate, meters.
    pub epy: Option<f64>,
}

impl Tpv {
    /// Minimum mode required for a request.
    pub fn required_mode(high_accuracy: bool) -> u8 {
        if high_accuracy {
            MODE_3D
        } else {
            MODE_2D
        }
    }

    /// Horizontal accuracy: `eph`, else the combined `epx`/`epy`.
    pub fn horizontal_accuracy(&self) -> Option<f64> {
        self.eph.or(match (self.epx, self.epy) {
            (Some(x), Some(y)) => Some(x.hypot(y)),
            _ => None,
        })
    }

    /// Fix timestamp in Unix epoch milliseconds.
    pub fn timestamp_millis(&self) -> Option<i64> {
        let time = self.time.as_deref()?;
        chrono::DateTime::parse_from_rfc3339(time)
            .ok()
            .map(|t| t.timestamp_millis())
    }

    /// Convert to a platform fix if the report is good enough.
    ///
    /// Returns `None` when the mode is below what the request needs or when
    /// position or error estimate is missing. Reports without a parseable
    /// time are stamped with the current time.
    pub fn to_fix(&self, high_accuracy: bool) -> Option<PlatformFix> {
        if self.mode < Self::required_mode(high_accuracy) {
            trace!(mode = self.mode, high_accuracy, "TPV below required fix mode");
            return None;
        }

        let latitude = self.lat?;
        let longitude = self.lon?;
        let accuracy_meters = self.horizontal_accuracy()?;
        let timestamp_millis = self
            .timestamp_millis()
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

        Some(PlatformFix {
            latitude,
            longitude,
            accuracy_meters,
            timestamp_millis,
        })
    }
}

/// Decode one line of gpsd output.
pub fn parse_report(line: &str) -> Result<Report, serde_json::Error> {
    serde_json::from_str(line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TPV_3D: &str = r#"{"class":"TPV","device":"/dev/ttyUSB0","mode":3,"time":"2023-11-14T22:13:20.000Z","ept":0.005,"lat":35.4676,"lon":-97.5164,"alt":370.1,"epx":8.0,"epy":9.0,"epv":20.0,"track":0.0,"speed":0.0,"eph":12.0}"#;
    const TPV_2D_NO_EPH: &str = r#"{"class":"TPV","mode":2,"time":"2023-11-14T22:13:21Z","lat":35.4,"lon":-97.5,"epx":3.0,"epy":4.0}"#;
    const TPV_NO_FIX: &str = r#"{"class":"TPV","device":"/dev/ttyUSB0","mode":1}"#;

    #[test]
    fn test_parse_version() {
        let report = parse_report(
            r#"{"class":"VERSION","release":"3.25","rev":"3.25","proto_major":3,"proto_minor":15}"#,
        )
        .unwrap();

        assert_eq!(
            report,
            Report::Version {
                release: "3.25".to_string(),
                proto_major: 3,
                proto_minor: 15,
            }
        );
    }

    #[test]
    fn test_parse_tpv_3d() {
        let Report::Tpv(tpv) = parse_report(TPV_3D).unwrap() else {
            panic!("expected TPV");
        };

        assert_eq!(tpv.mode, MODE_3D);
        assert_eq!(tpv.device.as_deref(), Some("/dev/ttyUSB0"));

        let fix = tpv.to_fix(true).unwrap();
        assert_eq!(fix.latitude, 35.4676);
        assert_eq!(fix.longitude, -97.5164);
        assert_eq!(fix.accuracy_meters, 12.0);
        assert_eq!(fix.timestamp_millis, 1_700_000_000_000);
    }

    #[test]
    fn test_2d_fix_only_satisfies_low_accuracy() {
        let Report::Tpv(tpv) = parse_report(TPV_2D_NO_EPH).unwrap() else {
            panic!("expected TPV");
        };

        assert!(tpv.to_fix(true).is_none());

        let fix = tpv.to_fix(false).unwrap();
        assert_eq!(fix.accuracy_meters, 5.0);
        assert_eq!(fix.timestamp_millis, 1_700_000_001_000);
    }

    #[test]
    fn test_no_fix_report() {
        let Report::Tpv(tpv) = parse_report(TPV_NO_FIX).unwrap() else {
            panic!("expected TPV");
        };

        assert!(tpv.to_fix(false).is_none());
        assert!(tpv.horizontal_accuracy().is_none());
    }

    #[test]
    fn test_missing_error_estimate_is_skipped() {
        let tpv = Tpv {
            mode: MODE_3D,
            lat: Some(1.0),
            lon: Some(2.0),
            ..Default::default()
        };
        assert!(tpv.to_fix(false).is_none());
    }

    #[test]
    fn test_missing_time_uses_now() {
        let tpv = Tpv {
            mode: MODE_3D,
            lat: Some(1.0),
            lon: Some(2.0),
            eph: Some(4.0),
            time: Some("garbage".to_string()),
            ..Default::default()
        };

        let before = chrono::Utc::now().timestamp_millis();
        let fix = tpv.to_fix(true).unwrap();
        assert!(fix.timestamp_millis >= before);
    }

    #[test]
    fn test_other_and_error_reports() {
        assert_eq!(
            parse_report(r#"{"class":"SKY","device":"/dev/ttyUSB0","satellites":[]}"#).unwrap(),
            Report::Other
        );
        assert_eq!(
            parse_report(r#"{"class":"ERROR","message":"unrecognized command"}"#).unwrap(),
            Report::Error {
                message: "unrecognized command".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_line() {
        assert!(parse_report("not json").is_err());
        assert!(parse_report(r#"{"no_class":1}"#).is_err());
    }

    #[test]
    fn test_watch_command_is_terminated() {
        assert!(WATCH_COMMAND.starts_with(b"?WATCH="));
        assert!(WATCH_COMMAND.ends_with(b";\n"));
    }
}
