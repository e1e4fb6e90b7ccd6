use crate::{
    AudioRecorder, RecordedFile, RecordingOptions, SetupOrchestrator, SetupOutcome, Stage,
    media::simulated::{SimulatedHost, SimulatedHostConfig},
    mime::default_candidates,
};

use std::sync::{Arc, Mutex};

/// Bytes the default simulated host produces per second of capture.
pub(crate) const BYTES_PER_SECOND: usize = 16_000;

pub(crate) struct Harness {
    pub(crate) host: Arc<SimulatedHost>,
    pub(crate) orchestrator: SetupOrchestrator<SimulatedHost>,
    pub(crate) recorder: AudioRecorder<SimulatedHost>,
    pub(crate) finished: Arc<Mutex<Vec<RecordedFile>>>,
}

/// Host, completed setup, and a recorder that collects finished files.
#[allow(clippy::unwrap_used)]
pub(crate) async fn ready_harness(options: RecordingOptions) -> Harness {
    harness_with(SimulatedHostConfig::default(), options, true).await
}

/// Same as [`ready_harness`] but lets the caller shape the host and skip the
/// setup step.
#[allow(clippy::unwrap_used)]
pub(crate) async fn harness_with(
    config: SimulatedHostConfig,
    options: RecordingOptions,
    acquire: bool,
) -> Harness {
    let host = Arc::new(SimulatedHost::new(config));
    let orchestrator = SetupOrchestrator::new(Arc::clone(&host), default_candidates());

    if acquire {
        let outcome = orchestrator.enter_stage(Stage::Intro).await.unwrap();
        assert_eq!(outcome, SetupOutcome::Ready);
    }

    let finished = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&finished);
    let recorder = AudioRecorder::new(Arc::clone(&host), orchestrator.subscribe(), options)
        .on_record_finish(move |file| sink.lock().unwrap().push(file));

    Harness {
        host,
        orchestrator,
        recorder,
        finished,
    }
}

/// Let `n` ticks elapse on the paused clock and apply them.
pub(crate) async fn ticks(recorder: &mut AudioRecorder<SimulatedHost>, n: u32) {
    for _ in 0..n {
        recorder.step().await;
    }
}

pub(crate) fn options(max_length: u32) -> RecordingOptions {
    RecordingOptions {
        auto_record: false,
        max_length,
    }
}
