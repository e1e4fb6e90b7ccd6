use crate::recorder::RecorderEvent;

use tokio::sync::mpsc;
use uuid::Uuid;

/// Notifications from a capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CaptureEvent {
    /// A chunk of encoded audio is available.
    Data(Vec<u8>),
    /// Capture stopped and all buffered data has been delivered.
    Stopped,
    /// Capture failed.
    Error(String),
}

/// Notifications from a playback handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaybackEvent {
    /// Playback reached the end of the media.
    Ended,
}

/// Channel through which a capture session reports back to the recorder.
///
/// Every notification is tagged with the session id, so reports from a
/// session the recorder has already discarded are ignored.
#[derive(Debug, Clone)]
pub struct CaptureSink {
    session_id: Uuid,
    tx: mpsc::UnboundedSender<RecorderEvent>,
}

impl CaptureSink {
    pub(crate) fn new(session_id: Uuid, tx: mpsc::UnboundedSender<RecorderEvent>) -> Self {
        Self { session_id, tx }
    }

    /// Id of the capture session this sink belongs to.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Report a chunk of captured data. Empty chunks are accepted and dropped
    /// by the recorder.
    pub fn data_available(&self, chunk: Vec<u8>) {
        self.send(CaptureEvent::Data(chunk));
    }

    /// Report that capture has stopped and every chunk has been delivered.
    pub fn stopped(&self) {
        self.send(CaptureEvent::Stopped);
    }

    /// Report a capture failure.
    pub fn error(&self, message: impl Into<String>) {
        self.send(CaptureEvent::Error(message.into()));
    }

    fn send(&self, event: CaptureEvent) {
        // The recorder may already be gone; nothing is listening then.
        let _ = self.tx.send(RecorderEvent::Capture {
            session_id: self.session_id,
            event,
        });
    }
}

/// Channel through which a playback handle reports back to the recorder.
#[derive(Debug, Clone)]
pub struct PlaybackSink {
    player_id: Uuid,
    tx: mpsc::UnboundedSender<RecorderEvent>,
}

impl PlaybackSink {
    pub(crate) fn new(player_id: Uuid, tx: mpsc::UnboundedSender<RecorderEvent>) -> Self {
        Self { player_id, tx }
    }

    /// Report that playback reached the end of the media.
    pub fn ended(&self) {
        let _ = self.tx.send(RecorderEvent::Playback {
            player_id: self.player_id,
            event: PlaybackEvent::Ended,
        });
    }
}
