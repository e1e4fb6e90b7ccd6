//! Text rendering of the recorder widget.
//!
//! Everything here is a pure function of a [`RecorderSnapshot`], so the
//! terminal layout can be tested without a running recorder.

use audio_recorder_core::{RecordedFileInfo, RecorderIntent, RecorderSnapshot, RecorderStatus};

/// Cells in the rendered progress bar.
pub(crate) const PROGRESS_CELLS: usize = 20;

/// A widget button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlAction {
    Record,
    StopRecording,
    Play,
    StopPlaying,
    Reset,
}

impl ControlAction {
    /// Command word that triggers the action.
    pub(crate) fn command(self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::StopRecording | Self::StopPlaying => "stop",
            Self::Play => "play",
            Self::Reset => "reset",
        }
    }

    pub(crate) fn intent(self) -> RecorderIntent {
        match self {
            Self::Record => RecorderIntent::StartRecording,
            Self::StopRecording => RecorderIntent::StopRecording,
            Self::Play => RecorderIntent::StartPlaying,
            Self::StopPlaying => RecorderIntent::StopPlaying,
            Self::Reset => RecorderIntent::Reset,
        }
    }
}

/// A button plus whether it can be pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Control {
    pub(crate) action: ControlAction,
    pub(crate) enabled: bool,
}

/// Buttons shown for a snapshot.
///
/// Record/stop until a file exists, then play/stop plus reset. Reset is only
/// offered without auto-record.
pub(crate) fn controls(snapshot: &RecorderSnapshot, auto_record: bool) -> Vec<Control> {
    let flags = snapshot.flags;

    if snapshot.recorded_file.is_none() {
        let action = if flags.is_recording {
            ControlAction::StopRecording
        } else {
            ControlAction::Record
        };
        return vec![Control {
            action,
            enabled: !flags.is_error,
        }];
    }

    let play = Control {
        action: if flags.is_playing {
            ControlAction::StopPlaying
        } else {
            ControlAction::Play
        },
        enabled: true,
    };

    if auto_record {
        vec![play]
    } else {
        vec![
            play,
            Control {
                action: ControlAction::Reset,
                enabled: flags.is_stopped,
            },
        ]
    }
}

/// Map a typed command to the intent of an enabled control.
pub(crate) fn parse_command(input: &str, controls: &[Control]) -> Option<RecorderIntent> {
    let word = input.trim().to_ascii_lowercase();

    controls
        .iter()
        .find(|control| control.enabled && control.action.command() == word)
        .map(|control| control.action.intent())
}

/// `[#####---------------]` filled to `percent`, clamped to 0..=100.
pub(crate) fn progress_bar(percent: f64) -> String {
    let clamped = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    let filled = ((clamped / 100.0) * PROGRESS_CELLS as f64).round() as usize;

    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_CELLS - filled)
    )
}

/// `MM:SS`, hidden while idle.
pub(crate) fn timer(snapshot: &RecorderSnapshot) -> Option<String> {
    snapshot
        .time_count
        .as_ref()
        .map(|count| format!("{}:{}", count.minutes, count.seconds))
}

pub(crate) fn error_line(snapshot: &RecorderSnapshot) -> Option<&str> {
    match &snapshot.status {
        RecorderStatus::Error { message } => Some(message),
        _ => None,
    }
}

/// The full widget: buttons, progress bar, timer, and the error line.
pub(crate) fn render(snapshot: &RecorderSnapshot, auto_record: bool) -> String {
    let buttons = controls(snapshot, auto_record)
        .iter()
        .map(|control| {
            if control.enabled {
                format!("({})", control.action.command())
            } else {
                format!("({}, disabled)", control.action.command())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut line = format!(
        "{:<9} {} {}",
        snapshot.status.as_str(),
        buttons,
        progress_bar(snapshot.progress_percent)
    );

    if let Some(timer) = timer(snapshot) {
        line.push(' ');
        line.push_str(&timer);
    }

    if let Some(message) = error_line(snapshot) {
        line.push('\n');
        line.push_str("  ! ");
        line.push_str(message);
    }

    line
}

/// Whether `take` is the file the recorder still holds.
///
/// A reset discards the take, and a new recording gets a new name.
pub(crate) fn is_current_take(snapshot: &RecorderSnapshot, take: &RecordedFileInfo) -> bool {
    snapshot
        .recorded_file
        .as_ref()
        .is_some_and(|held| held.name == take.name)
}

/// One-line description of a finished recording.
pub(crate) fn file_summary(info: &RecordedFileInfo) -> String {
    format!(
        "{} ({}, {} bytes, {}s)",
        info.name, info.mime_type, info.size, info.duration_secs
    )
}
