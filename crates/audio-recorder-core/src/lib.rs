//! Audio Recorder Core Library
//!
//! Microphone capture and playback state machine with timer and progress
//! derivation, independent of any particular media host.
//!
//! # Example
//!
//! ```no_run
//! use audio_recorder_core::{
//!     AudioRecorder, CoreResult, RecordingOptions, SetupOrchestrator, Stage,
//!     media::simulated::{SimulatedHost, SimulatedHostConfig},
//!     mime::default_candidates,
//! };
//!
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let host = Arc::new(SimulatedHost::new(SimulatedHostConfig::default()));
//!     let orchestrator = SetupOrchestrator::new(Arc::clone(&host), default_candidates());
//!     orchestrator.enter_stage(Stage::Intro).await?;
//!
//!     let mut recorder =
//!         AudioRecorder::new(host, orchestrator.subscribe(), RecordingOptions::default())
//!             .on_record_finish(|file| println!("Recorded {} ({} bytes)", file.name(), file.size()));
//!
//!     recorder.start_recording()?;
//!     for _ in 0..3 {
//!         recorder.step().await;
//!     }
//!     recorder.stop_recording()?;
//!     recorder.drain_pending();
//!
//!     Ok(())
//! }
//! ```

mod error;
pub mod media;
pub mod mime;
mod recorder;
mod setup;
pub mod timing;

pub use {
    error::{RecorderError, Result as CoreResult},
    recorder::{
        AudioRecorder, DEFAULT_MAX_LENGTH, FinishCallback, RecordedFile, RecordedFileInfo,
        RecorderIntent, RecorderSnapshot, RecorderStatus, RecordingOptions, StatusFlags,
        UNSUPPORTED_RECORDING_MESSAGE,
    },
    setup::{SetupOrchestrator, SetupOutcome, SetupReceiver, Stage, UserAudioSetup},
};

#[cfg(test)]
mod tests;
