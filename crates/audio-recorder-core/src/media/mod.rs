//! Host media capability surface.
//!
//! The recorder never talks to a device directly. Stream acquisition,
//! capture and playback are reached through [`MediaHost`], so any host that
//! honours this contract (a browser bridge, a native audio stack, or the
//! [`simulated`] host) is interchangeable.

mod host;
mod sink;
pub mod simulated;

pub use {
    host::{CaptureRecorder, HostError, MediaHost, MediaStream, Playback},
    sink::{CaptureSink, PlaybackSink},
};

pub(crate) use sink::{CaptureEvent, PlaybackEvent};

use crate::{CoreResult, RecorderError};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{error, info, instrument};

/// Request a live audio-only input stream from the host.
///
/// Blocks for as long as the host's permission prompt does; no timeout or
/// retry is applied.
///
/// # Errors
///
/// Returns [`RecorderError::PermissionDenied`] or
/// [`RecorderError::DeviceUnavailable`] for the matching host failures and
/// [`RecorderError::Host`] for anything else.
#[instrument(skip(host))]
pub async fn acquire_audio_stream<H: MediaHost>(host: &H) -> CoreResult<H::Stream> {
    let location = ErrorLocation::from(Location::caller());

    match host.request_audio_stream().await {
        Ok(stream) => {
            info!("Microphone stream acquired");
            Ok(stream)
        }
        Err(HostError::PermissionDenied(reason)) => {
            error!(reason = %reason, "Microphone permission denied");
            Err(RecorderError::PermissionDenied { reason, location })
        }
        Err(HostError::DeviceUnavailable(reason)) => {
            error!(reason = %reason, "Microphone unavailable");
            Err(RecorderError::DeviceUnavailable { reason, location })
        }
        Err(source) => {
            error!(error = ?source, "Failed to acquire microphone stream");
            Err(RecorderError::Host { source, location })
        }
    }
}
