use crate::presenter::{
    Control, ControlAction, PROGRESS_CELLS, controls, file_summary, is_current_take, parse_command,
    progress_bar, render, timer,
};

use audio_recorder_core::{
    RecordedFileInfo, RecorderIntent, RecorderSnapshot, RecorderStatus, timing::TimeCount,
};

fn snapshot(status: RecorderStatus, with_file: bool) -> RecorderSnapshot {
    RecorderSnapshot {
        flags: status.flags(),
        status,
        current_time: 0,
        recorded_file_duration: with_file.then_some(4),
        progress_percent: 0.0,
        time_count: None,
        recorded_file: with_file.then(|| RecordedFileInfo {
            name: "take.webm".to_string(),
            mime_type: "audio/webm".to_string(),
            size: 64_000,
            duration_secs: 4,
        }),
    }
}

fn actions(controls: &[Control]) -> Vec<(ControlAction, bool)> {
    controls.iter().map(|c| (c.action, c.enabled)).collect()
}

/// WHAT: Without a file the widget offers record, or stop while recording
/// WHY: Playback controls only make sense once a take exists
#[test]
fn given_no_file_when_listing_controls_then_record_or_stop() {
    // Given/When: Idle and recording without a file
    let idle = controls(&snapshot(RecorderStatus::Idle, false), false);
    let recording = controls(&snapshot(RecorderStatus::Recording, false), false);

    // Then: A single toggle
    assert_eq!(actions(&idle), vec![(ControlAction::Record, true)]);
    assert_eq!(actions(&recording), vec![(ControlAction::StopRecording, true)]);
}

/// WHAT: Record is disabled in the error status
/// WHY: A failed capture cannot be restarted from the widget
#[test]
fn given_error_status_when_listing_controls_then_record_disabled() {
    let status = RecorderStatus::Error {
        message: "Your browser/device does not support audio recording".to_string(),
    };

    let listed = controls(&snapshot(status, false), false);

    assert_eq!(actions(&listed), vec![(ControlAction::Record, false)]);
}

/// WHAT: With a file the widget offers play and reset
/// WHY: Reset is enabled only while stopped
#[test]
fn given_file_when_listing_controls_then_play_and_reset() {
    // Given/When: Stopped and playing with a file
    let stopped = controls(&snapshot(RecorderStatus::Stopped, true), false);
    let playing = controls(&snapshot(RecorderStatus::Playing, true), false);

    // Then: Reset follows the stopped flag
    assert_eq!(
        actions(&stopped),
        vec![(ControlAction::Play, true), (ControlAction::Reset, true)]
    );
    assert_eq!(
        actions(&playing),
        vec![(ControlAction::StopPlaying, true), (ControlAction::Reset, false)]
    );
}

/// WHAT: Auto-record hides reset
/// WHY: Resetting would immediately start a new take
#[test]
fn given_auto_record_when_listing_controls_then_no_reset() {
    let listed = controls(&snapshot(RecorderStatus::Stopped, true), true);

    assert_eq!(actions(&listed), vec![(ControlAction::Play, true)]);
}

/// WHAT: Commands map only to enabled controls
/// WHY: Typed input follows the same rules as the buttons
#[test]
fn given_controls_when_parsing_commands_then_only_enabled_intents() {
    // Given: Playing with a file, reset disabled
    let listed = controls(&snapshot(RecorderStatus::Playing, true), false);

    // When/Then: stop maps to stop playing, reset and record are refused
    assert_eq!(parse_command(" Stop ", &listed), Some(RecorderIntent::StopPlaying));
    assert_eq!(parse_command("reset", &listed), None);
    assert_eq!(parse_command("record", &listed), None);
}

/// WHAT: The progress bar is clamped for rendering
/// WHY: Progress may exceed 100 or be NaN without breaking the layout
#[test]
fn given_out_of_range_percent_when_rendering_bar_then_clamped() {
    let full = format!("[{}]", "#".repeat(PROGRESS_CELLS));
    let empty = format!("[{}]", "-".repeat(PROGRESS_CELLS));

    assert_eq!(progress_bar(150.0), full);
    assert_eq!(progress_bar(-20.0), empty);
    assert_eq!(progress_bar(f64::NAN), empty);
    assert_eq!(progress_bar(f64::INFINITY), full);
    assert_eq!(progress_bar(50.0), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
}

/// WHAT: The timer renders MM:SS and is hidden while idle
/// WHY: The widget shows no time before recording
#[test]
fn given_time_count_when_rendering_timer_then_minutes_and_seconds() {
    let idle = snapshot(RecorderStatus::Idle, false);
    let mut recording = snapshot(RecorderStatus::Recording, false);
    recording.time_count = Some(TimeCount {
        minutes: "00".to_string(),
        seconds: "07".to_string(),
        milliseconds: "007".to_string(),
    });

    assert_eq!(timer(&idle), None);
    assert_eq!(timer(&recording), Some("00:07".to_string()));
}

/// WHAT: The error message is rendered under the controls
/// WHY: Users must see why recording is unavailable
#[test]
fn given_error_status_when_rendering_then_message_line_appended() {
    let status = RecorderStatus::Error {
        message: "capture device lost".to_string(),
    };

    let frame = render(&snapshot(status, false), false);

    assert!(frame.starts_with("error"));
    assert!(frame.contains("(record, disabled)"));
    assert!(frame.ends_with("\n  ! capture device lost"));
}

/// WHAT: File summaries name the file, type, size and duration
/// WHY: The results stage describes the finished take
#[test]
fn given_file_info_when_summarizing_then_all_fields_present() {
    let info = RecordedFileInfo {
        name: "take.ogg".to_string(),
        mime_type: "audio/ogg".to_string(),
        size: 1_024,
        duration_secs: 3,
    };

    assert_eq!(file_summary(&info), "take.ogg (audio/ogg, 1024 bytes, 3s)");
}

/// WHAT: A finished take stays current only while the recorder holds it
/// WHY: After a reset the results stage must not show a discarded take
#[test]
#[allow(clippy::unwrap_used)]
fn given_reset_after_take_when_checking_current_take_then_not_current() {
    // Given: The take announced by the finish callback
    let held = snapshot(RecorderStatus::Stopped, true);
    let take = held.recorded_file.clone().unwrap();

    // When: The recorder is reset, or a newer take replaces it
    let reset = snapshot(RecorderStatus::Idle, false);
    let mut replaced = snapshot(RecorderStatus::Stopped, true);
    if let Some(file) = replaced.recorded_file.as_mut() {
        file.name = "newer.webm".to_string();
    }

    // Then: Only the holding snapshot accepts the take
    assert!(is_current_take(&held, &take));
    assert!(!is_current_take(&reset, &take));
    assert!(!is_current_take(&replaced, &take));
}
