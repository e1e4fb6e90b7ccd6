//! Display time and progress derivation.
//!
//! Pure functions over the recorder's raw counters. Arithmetic uses web number
//! semantics so rendered values match browser widgets digit for digit:
//! rounding is half-up, `%` keeps the sign of the dividend, and integral
//! values print without a fractional part.

use crate::recorder::RecorderStatus;

use serde::Serialize;

/// Human-readable timer value. All fields are zero-padded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeCount {
    /// Minutes, width 2.
    pub minutes: String,
    /// Seconds, width 2.
    pub seconds: String,
    /// Milliseconds, width 3 while timing.
    pub milliseconds: String,
}

/// Whether the timer counts up.
///
/// Recording with a max length counts down; playback and unlimited
/// recording count up.
pub fn is_ascending(status: &RecorderStatus, max_length: f64) -> bool {
    max_length == 0.0 || max_length.is_nan() || status.flags().is_playing
}

/// Derive the timer display.
///
/// - idle: nothing to show
/// - stopped: total seconds as recorded, not wrapped at 60
/// - recording/playing: `current_time` counted up, or remaining time of
///   `max_length` counted down
pub fn derive_display_time(
    status: &RecorderStatus,
    current_time: f64,
    max_length: f64,
    ascending: bool,
) -> Option<TimeCount> {
    let flags = status.flags();

    if flags.is_idle {
        return None;
    }

    if flags.is_stopped {
        return Some(TimeCount {
            minutes: "00".to_string(),
            seconds: pad_start(&format_number(current_time.floor()), 2),
            milliseconds: "00".to_string(),
        });
    }

    let (minutes, seconds, milliseconds) = if ascending {
        (
            (current_time / 60.0).floor(),
            (round_half_up(current_time) % 60.0).floor(),
            current_time % 1000.0,
        )
    } else {
        let remaining = max_length - round_half_up(current_time);
        (
            (remaining / 60.0).floor(),
            (remaining % 60.0).floor(),
            (max_length - current_time) % 1000.0,
        )
    };

    Some(TimeCount {
        minutes: pad_start(&format_number(minutes), 2),
        seconds: pad_start(&format_number(seconds), 2),
        milliseconds: pad_start(&format_number(milliseconds), 3),
    })
}

/// Derive the progress indicator in percent.
///
/// Not clamped: a playback that outlives the recorded duration reports more
/// than 100, and an unlimited recording divides by zero (`inf`, or `NaN` at
/// counter 0). A missing or zero duration falls back to 1.
pub fn derive_progress_percent(
    status: &RecorderStatus,
    current_time: f64,
    max_length: f64,
    recorded_file_duration: Option<f64>,
) -> f64 {
    let flags = status.flags();

    if flags.is_idle {
        return 0.0;
    }

    if flags.is_recording {
        return current_time.floor() / max_length * 100.0;
    }

    let duration = recorded_file_duration
        .filter(|duration| *duration != 0.0 && !duration.is_nan())
        .unwrap_or(1.0);

    round_half_up(current_time) / round_half_up(duration) * 100.0
}

/// Halves round towards positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Shortest decimal form, with web spellings for the non-finite values.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value == 0.0 {
        // Also covers -0.
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn pad_start(value: &str, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}
