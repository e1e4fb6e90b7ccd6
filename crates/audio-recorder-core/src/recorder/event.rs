use crate::media::{CaptureEvent, PlaybackEvent};

use uuid::Uuid;

/// Everything the recorder reacts to besides direct calls.
#[derive(Debug)]
pub(crate) enum RecorderEvent {
    /// One period of the elapsed counter passed.
    Tick { ticker_id: u64 },
    /// A capture session reported back.
    Capture { session_id: Uuid, event: CaptureEvent },
    /// A playback handle reported back.
    Playback { player_id: Uuid, event: PlaybackEvent },
}

/// User intents forwarded by a presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderIntent {
    /// Begin capturing.
    StartRecording,
    /// Finish capturing.
    StopRecording,
    /// Play the recorded file.
    StartPlaying,
    /// Stop playback and rewind.
    StopPlaying,
    /// Discard the recording.
    Reset,
    /// Stop the recorder's event loop.
    Shutdown,
}
