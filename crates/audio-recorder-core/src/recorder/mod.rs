mod event;
mod file;
mod machine;
mod options;
mod snapshot;
mod status;
pub(crate) mod ticker;

pub(crate) use event::RecorderEvent;

pub use {
    event::RecorderIntent,
    file::{RecordedFile, RecordedFileInfo},
    machine::{AudioRecorder, FinishCallback},
    options::{DEFAULT_MAX_LENGTH, RecordingOptions},
    snapshot::RecorderSnapshot,
    status::{RecorderStatus, StatusFlags, UNSUPPORTED_RECORDING_MESSAGE},
};
