use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

/// A finished recording. Immutable once composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFile {
    name: String,
    data: Arc<[u8]>,
    mime_type: String,
    duration_secs: u32,
}

impl RecordedFile {
    /// Compose a file from captured chunks under a fresh random name.
    pub(crate) fn compose(
        chunks: Vec<Vec<u8>>,
        mime_type: &str,
        extension: &str,
        duration_secs: u32,
    ) -> Self {
        Self {
            name: format!("{}.{}", Uuid::new_v4(), extension),
            data: chunks.concat().into(),
            mime_type: mime_type.to_string(),
            duration_secs,
        }
    }

    /// Generated file name, `<uuid>.<extension>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded audio payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// MIME type of the payload.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Elapsed seconds at the moment recording was stopped.
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Metadata view without the payload.
    pub fn info(&self) -> RecordedFileInfo {
        RecordedFileInfo {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size(),
            duration_secs: self.duration_secs,
        }
    }
}

/// Serializable summary of a [`RecordedFile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedFileInfo {
    /// Generated file name.
    pub name: String,
    /// MIME type of the payload.
    pub mime_type: String,
    /// Payload size in bytes.
    pub size: usize,
    /// Recorded duration in seconds.
    pub duration_secs: u32,
}
