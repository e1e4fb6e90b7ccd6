use crate::{
    media::{CaptureSink, PlaybackSink},
    recorder::RecordedFile,
};

use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a media host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Access to the microphone was refused.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// No input device could be opened.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The host cannot perform the requested operation at all.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The operation was attempted and failed.
    #[error("{0}")]
    Failed(String),
}

/// A live microphone stream owned by the setup orchestrator.
pub trait MediaStream: Send + Sync + 'static {
    /// Stop every track of the stream, releasing the device.
    fn stop_tracks(&self);

    /// Whether the stream still has live tracks.
    fn is_live(&self) -> bool;
}

/// A capture session primitive built on top of a stream.
///
/// Data, stop completion and errors are reported through the
/// [`CaptureSink`] the recorder was created with, never as return values.
pub trait CaptureRecorder: Send + 'static {
    /// Begin capturing.
    fn start(&mut self) -> Result<(), HostError>;

    /// Request capture to stop. Completion is signalled later through
    /// [`CaptureSink::stopped`], after buffered data has been flushed.
    fn stop(&mut self) -> Result<(), HostError>;
}

/// A playback primitive bound to one recorded file.
#[async_trait]
pub trait Playback: Send + 'static {
    /// Start or resume playback once the host is ready.
    async fn play(&mut self) -> Result<(), HostError>;

    /// Pause playback, keeping the position.
    fn pause(&mut self);

    /// Move the playback position.
    fn seek(&mut self, position_secs: f64);

    /// Release the resource bound to the recorded file.
    fn release(&mut self);
}

/// Injected device, capture and playback capabilities.
#[async_trait]
pub trait MediaHost: Send + Sync + 'static {
    /// Microphone stream handle.
    type Stream: MediaStream;
    /// Capture session primitive.
    type Recorder: CaptureRecorder;
    /// Playback primitive.
    type Player: Playback;

    /// Whether the environment can record audio at all.
    fn is_recording_supported(&self) -> bool;

    /// Whether capture in the given MIME type is supported.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Ask for an audio-only input stream. May wait on a permission prompt.
    async fn request_audio_stream(&self) -> Result<Self::Stream, HostError>;

    /// Build a capture session on `stream` that reports through `sink`.
    fn create_recorder(
        &self,
        stream: &Self::Stream,
        mime_type: &str,
        sink: CaptureSink,
    ) -> Result<Self::Recorder, HostError>;

    /// Prepare playback of `file`, reporting end of media through `sink`.
    fn create_player(
        &self,
        file: &RecordedFile,
        sink: PlaybackSink,
    ) -> Result<Self::Player, HostError>;
}
