use audio_recorder_core::RecordedFile;

/// Commands delivered to the main application loop.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// A line typed by the user.
    Input(String),
    /// The recorder finished composing a recording.
    RecordFinished(RecordedFile),
    /// Request application shutdown.
    Shutdown,
}
