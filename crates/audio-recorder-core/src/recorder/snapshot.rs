use crate::{
    recorder::{RecordedFileInfo, RecorderStatus, StatusFlags},
    timing::TimeCount,
};

use serde::Serialize;

/// Point-in-time view of the recorder for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecorderSnapshot {
    /// Current status.
    #[serde(flatten)]
    pub status: RecorderStatus,
    /// Boolean view of `status`.
    #[serde(skip)]
    pub flags: StatusFlags,
    /// Elapsed seconds in the current phase.
    pub current_time: u32,
    /// Duration captured when recording stopped.
    pub recorded_file_duration: Option<u32>,
    /// Progress indicator, unclamped.
    pub progress_percent: f64,
    /// Timer display, absent while idle.
    pub time_count: Option<TimeCount>,
    /// Summary of the finished recording.
    pub recorded_file: Option<RecordedFileInfo>,
}
