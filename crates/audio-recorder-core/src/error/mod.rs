use crate::media::HostError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Recorder errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// None of the candidate MIME types can be captured by the host.
    #[error("No supported MIME type found among candidates {location}")]
    NoSupportedFormat {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The negotiated MIME type has no known file extension.
    #[error("No file extension known for MIME type {mime_type} {location}")]
    ExtensionNotFound {
        /// MIME type without an extension mapping.
        mime_type: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The user or platform refused microphone access.
    #[error("Microphone permission denied: {reason} {location}")]
    PermissionDenied {
        /// Reason reported by the host.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No usable audio input device.
    #[error("Microphone unavailable: {reason} {location}")]
    DeviceUnavailable {
        /// Reason reported by the host.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture or playback primitive failed.
    #[error("Media host error: {source} {location}")]
    Host {
        /// Underlying host error.
        #[source]
        source: HostError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Recording was requested without an acquired, live stream.
    #[error("Failed to start recording: media stream is missing {location}")]
    MissingStream {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stop was requested without an open capture session.
    #[error("Failed to stop recording: no open capture session {location}")]
    NoCaptureSession {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback control was requested before a file was prepared.
    #[error("Failed to {action}: no playback handle {location}")]
    NoPlaybackHandle {
        /// Operation that was attempted.
        action: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Operation not valid from the current status.
    #[error("Invalid transition: cannot {action} while {status} {location}")]
    InvalidTransition {
        /// Operation that was attempted.
        action: &'static str,
        /// Status at the time of the attempt.
        status: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl RecorderError {
    /// Whether this error is a caller-contract violation rather than a
    /// runtime condition of the environment.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingStream { .. }
                | Self::NoCaptureSession { .. }
                | Self::NoPlaybackHandle { .. }
                | Self::InvalidTransition { .. }
        )
    }
}

// Manual From<HostError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<HostError> for RecorderError {
    #[track_caller]
    fn from(source: HostError) -> Self {
        RecorderError::Host {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
