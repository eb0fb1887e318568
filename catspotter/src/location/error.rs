//! Error types for location acquisition.

use thiserror::Error;

/// Failure code reported by a location platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    /// Any other platform-specific code.
    Other(i32),
}

/// A failed platform request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct PlatformFailure {
    pub code: PlatformErrorCode,
    pub message: String,
}

impl PlatformFailure {
    pub fn new(code: PlatformErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::PermissionDenied, message)
    }

    pub fn position_unavailable(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::PositionUnavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::Timeout, message)
    }
}

/// Terminal result of an acquisition that produced no reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AcquisitionError {
    /// The platform has no location capability at all.
    #[error("Geolocation is not supported on this platform")]
    Unsupported,

    /// The user or OS refused access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The platform could not resolve a fix.
    #[error("Position unavailable")]
    PositionUnavailable,

    /// The strategy deadline elapsed.
    #[error("Location request timed out")]
    Timeout,

    /// Unmapped platform failure.
    #[error("Unknown location error")]
    Unknown,

    /// The caller cancelled the pending request.
    #[error("Location request cancelled")]
    Cancelled,
}

impl AcquisitionError {
    /// Whether the mobile cascade may try its next strategy after this error.
    ///
    /// Only failures that a less demanding request could plausibly avoid
    /// qualify; permission, support and cancellation are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PositionUnavailable | Self::Timeout | Self::Unknown
        )
    }
}

impl From<PlatformErrorCode> for AcquisitionError {
    fn from(code: PlatformErrorCode) -> Self {
        match code {
            PlatformErrorCode::PermissionDenied => Self::PermissionDenied,
            PlatformErrorCode::PositionUnavailable => Self::PositionUnavailable,
            PlatformErrorCode::Timeout => Self::Timeout,
            PlatformErrorCode::Other(_) => Self::Unknown,
        }
    }
}

impl From<&PlatformFailure> for AcquisitionError {
    fn from(failure: &PlatformFailure) -> Self {
        failure.code.into()
    }
}

impl From<PlatformFailure> for AcquisitionError {
    fn from(failure: PlatformFailure) -> Self {
        failure.code.into()
    }
}
