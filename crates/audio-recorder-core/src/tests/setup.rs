use crate::{
    RecorderError, SetupOrchestrator, SetupOutcome, Stage,
    media::{
        MediaStream,
        simulated::{MicrophoneAvailability, SimulatedHost, SimulatedHostConfig},
    },
    mime::default_candidates,
};

use std::sync::Arc;

fn orchestrator(config: SimulatedHostConfig) -> (Arc<SimulatedHost>, SetupOrchestrator<SimulatedHost>) {
    let host = Arc::new(SimulatedHost::new(config));
    let orchestrator = SetupOrchestrator::new(Arc::clone(&host), default_candidates());
    (host, orchestrator)
}

/// WHAT: Entering intro acquires and publishes the setup
/// WHY: The recorder reads its stream and encoding from the published setup
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_intro_when_entering_then_setup_published() {
    // Given: A host capturing ogg only
    let (host, orchestrator) = orchestrator(SimulatedHostConfig {
        supported_mime_types: vec!["audio/ogg".to_string()],
        ..SimulatedHostConfig::default()
    });
    let subscriber = orchestrator.subscribe();
    assert!(subscriber.borrow().is_none());

    // When: Entering the intro stage
    let outcome = orchestrator.enter_stage(Stage::Intro).await.unwrap();

    // Then: Ready, visible to subscribers, with a live stream
    assert_eq!(outcome, SetupOutcome::Ready);
    let setup = subscriber.borrow().clone().unwrap();
    assert_eq!(setup.mime_type(), "audio/ogg");
    assert_eq!(setup.extension(), "ogg");
    assert!(setup.stream().is_live());
    assert_eq!(host.stream_requests(), 1);
    assert!(!orchestrator.last_attempt_failed());
}

/// WHAT: Repeated intro entries do not re-acquire
/// WHY: Setup runs once per intro phase
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_ready_setup_when_entering_intro_again_then_already_ready() {
    // Given: A completed setup
    let (host, orchestrator) = orchestrator(SimulatedHostConfig::default());
    orchestrator.enter_stage(Stage::Intro).await.unwrap();

    // When: Entering intro again
    let outcome = orchestrator.enter_stage(Stage::Intro).await.unwrap();

    // Then: Nothing new is requested
    assert_eq!(outcome, SetupOutcome::AlreadyReady);
    assert_eq!(host.stream_requests(), 1);
}

/// WHAT: Concurrent intro entries are suppressed while one is in flight
/// WHY: Duplicate permission prompts and leaked streams must not happen
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_concurrent_entries_when_setting_up_then_single_acquisition() {
    // Given: A host with a slow permission prompt
    let (host, orchestrator) = orchestrator(SimulatedHostConfig {
        acquire_delay_ms: 200,
        ..SimulatedHostConfig::default()
    });

    // When: Entering intro twice concurrently
    let (first, second) = tokio::join!(
        orchestrator.enter_stage(Stage::Intro),
        orchestrator.enter_stage(Stage::Intro)
    );

    // Then: One acquisition, one suppressed call
    let mut outcomes = [first.unwrap(), second.unwrap()];
    outcomes.sort_by_key(|o| *o == SetupOutcome::Ready);
    assert_eq!(outcomes, [SetupOutcome::InFlight, SetupOutcome::Ready]);
    assert_eq!(host.stream_requests(), 1);
    assert_eq!(host.live_streams(), 1);
}

/// WHAT: Non-intro stages do not acquire anything
/// WHY: Only the intro phase asks for permissions
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_stage_when_entering_then_skipped() {
    let (host, orchestrator) = orchestrator(SimulatedHostConfig::default());

    let outcome = orchestrator.enter_stage(Stage::Recording).await.unwrap();

    assert_eq!(outcome, SetupOutcome::Skipped);
    assert_eq!(host.stream_requests(), 0);
    assert!(orchestrator.current().is_none());
}

/// WHAT: Denied permission is a typed failure and leaves the setup empty
/// WHY: The UI shows a connection failure when setup stays empty
#[tokio::test(start_paused = true)]
async fn given_denied_microphone_when_entering_intro_then_permission_denied() {
    // Given: A host refusing microphone access
    let (_host, orchestrator) = orchestrator(SimulatedHostConfig {
        microphone: MicrophoneAvailability::Denied,
        ..SimulatedHostConfig::default()
    });

    // When: Entering intro
    let result = orchestrator.enter_stage(Stage::Intro).await;

    // Then: PermissionDenied, nothing published
    assert!(matches!(result, Err(RecorderError::PermissionDenied { .. })));
    assert!(orchestrator.current().is_none());
    assert!(orchestrator.last_attempt_failed());
}

/// WHAT: A missing device maps to DeviceUnavailable
/// WHY: Device and permission failures are reported distinctly
#[tokio::test(start_paused = true)]
async fn given_no_device_when_entering_intro_then_device_unavailable() {
    let (_host, orchestrator) = orchestrator(SimulatedHostConfig {
        microphone: MicrophoneAvailability::Unavailable,
        ..SimulatedHostConfig::default()
    });

    let result = orchestrator.enter_stage(Stage::Intro).await;

    assert!(matches!(result, Err(RecorderError::DeviceUnavailable { .. })));
}

/// WHAT: Negotiation runs before acquisition
/// WHY: No stream is opened when nothing can be captured
#[tokio::test(start_paused = true)]
async fn given_no_supported_type_when_entering_intro_then_no_stream_requested() {
    // Given: A host that captures nothing
    let (host, orchestrator) = orchestrator(SimulatedHostConfig {
        supported_mime_types: Vec::new(),
        ..SimulatedHostConfig::default()
    });

    // When: Entering intro
    let result = orchestrator.enter_stage(Stage::Intro).await;

    // Then: NoSupportedFormat and the microphone untouched
    assert!(matches!(result, Err(RecorderError::NoSupportedFormat { .. })));
    assert_eq!(host.stream_requests(), 0);
}

/// WHAT: A failed attempt can be retried on the next intro entry
/// WHY: The guard must not stay set after a failure
#[tokio::test(start_paused = true)]
async fn given_failed_attempt_when_entering_intro_again_then_retried() {
    let (host, orchestrator) = orchestrator(SimulatedHostConfig {
        microphone: MicrophoneAvailability::Unavailable,
        ..SimulatedHostConfig::default()
    });

    let _ = orchestrator.enter_stage(Stage::Intro).await;
    let second = orchestrator.enter_stage(Stage::Intro).await;

    assert!(second.is_err());
    assert_eq!(host.stream_requests(), 2);
}

/// WHAT: Teardown stops the tracks exactly once
/// WHY: Release must be a single designated operation
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_ready_setup_when_tearing_down_then_tracks_stopped_once() {
    // Given: A completed setup
    let (host, orchestrator) = orchestrator(SimulatedHostConfig::default());
    orchestrator.enter_stage(Stage::Intro).await.unwrap();
    let setup = orchestrator.current().unwrap();

    // When: Tearing down twice
    let first = orchestrator.teardown();
    let second = orchestrator.teardown();

    // Then: Released once, nothing published, stream dead
    assert!(first);
    assert!(!second);
    assert!(orchestrator.current().is_none());
    assert!(!setup.stream().is_live());
    assert_eq!(host.live_streams(), 0);
}

/// WHAT: Teardown followed by intro acquires a fresh stream
/// WHY: A new round starts with a new setup
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_torn_down_setup_when_reentering_intro_then_new_stream() {
    let (host, orchestrator) = orchestrator(SimulatedHostConfig::default());
    orchestrator.enter_stage(Stage::Intro).await.unwrap();
    orchestrator.enter_stage(Stage::Results).await.unwrap();
    orchestrator.teardown();

    let outcome = orchestrator.enter_stage(Stage::Intro).await.unwrap();

    assert_eq!(outcome, SetupOutcome::Ready);
    assert_eq!(host.stream_requests(), 2);
    assert_eq!(host.live_streams(), 1);
}

/// WHAT: A stage change during acquisition discards the result
/// WHY: A stream acquired for an abandoned phase must not leak
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_acquisition_in_flight_when_stage_changes_then_superseded() {
    // Given: A slow acquisition running in the background
    let (host, orchestrator) = orchestrator(SimulatedHostConfig {
        acquire_delay_ms: 500,
        ..SimulatedHostConfig::default()
    });
    let orchestrator = Arc::new(orchestrator);
    let background = Arc::clone(&orchestrator);
    let pending = tokio::spawn(async move { background.enter_stage(Stage::Intro).await });
    while host.stream_requests() == 0 {
        tokio::task::yield_now().await;
    }

    // When: The flow moves on before the prompt resolves
    orchestrator.enter_stage(Stage::Results).await.unwrap();
    let outcome = pending.await.unwrap().unwrap();

    // Then: Result discarded and its stream stopped
    assert_eq!(outcome, SetupOutcome::Superseded);
    assert!(orchestrator.current().is_none());
    assert_eq!(host.live_streams(), 0);
}
