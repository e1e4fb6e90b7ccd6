use std::fmt;

use serde::Serialize;

/// Message shown when the environment cannot record at all.
pub const UNSUPPORTED_RECORDING_MESSAGE: &str =
    "Your browser/device does not support audio recording";

/// Recorder status. Exactly one is active at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RecorderStatus {
    /// Ready to record; nothing captured yet.
    #[default]
    Idle,
    /// Capturing microphone input.
    Recording,
    /// Playing back the recorded file.
    Playing,
    /// A recording exists and nothing is running.
    Stopped,
    /// Recording is impossible in this environment.
    Error {
        /// User-facing explanation.
        message: String,
    },
}

impl RecorderStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Playing => "playing",
            Self::Stopped => "stopped",
            Self::Error { .. } => "error",
        }
    }

    /// One boolean per status, exactly one of them set.
    pub fn flags(&self) -> StatusFlags {
        StatusFlags {
            is_idle: matches!(self, Self::Idle),
            is_recording: matches!(self, Self::Recording),
            is_playing: matches!(self, Self::Playing),
            is_stopped: matches!(self, Self::Stopped),
            is_error: matches!(self, Self::Error { .. }),
        }
    }

    /// Whether the elapsed counter ticks in this status.
    pub fn is_timed(&self) -> bool {
        matches!(self, Self::Recording | Self::Playing)
    }
}

impl fmt::Display for RecorderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Boolean view of a [`RecorderStatus`] for presentation code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusFlags {
    /// Status is `Idle`.
    pub is_idle: bool,
    /// Status is `Recording`.
    pub is_recording: bool,
    /// Status is `Playing`.
    pub is_playing: bool,
    /// Status is `Stopped`.
    pub is_stopped: bool,
    /// Status is `Error`.
    pub is_error: bool,
}
