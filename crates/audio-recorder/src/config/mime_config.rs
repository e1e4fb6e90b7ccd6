use audio_recorder_core::mime::default_candidates;

use serde::{Deserialize, Serialize};

/// Capture encoding preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeConfig {
    /// MIME types to negotiate, highest priority first.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
}

impl Default for MimeConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
        }
    }
}
