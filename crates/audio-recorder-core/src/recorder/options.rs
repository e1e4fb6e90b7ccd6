use serde::{Deserialize, Serialize};

/// Default recording limit in seconds.
pub const DEFAULT_MAX_LENGTH: u32 = 10;

/// Recorder behaviour options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingOptions {
    /// Start capturing as soon as the recorder is idle and a stream is ready.
    #[serde(default)]
    pub auto_record: bool,

    /// Recording limit in seconds. Enables the countdown display and
    /// auto-stop; `0` disables both.
    #[serde(default = "default_max_length")]
    pub max_length: u32,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            auto_record: false,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

fn default_max_length() -> u32 {
    DEFAULT_MAX_LENGTH
}
