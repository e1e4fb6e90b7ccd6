//! One-time acquisition of the microphone stream and capture encoding.
//!
//! The orchestrator owns the stream. It publishes the resulting
//! [`UserAudioSetup`] through a `watch` channel that the recorder and the
//! presentation layer subscribe to, and it is the only component that stops
//! the stream's tracks (see [`SetupOrchestrator::teardown`]).

use crate::{
    CoreResult,
    media::{MediaHost, MediaStream, acquire_audio_stream},
    mime::{MimeSelection, select_mime_type},
};

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument};

/// Shared view of the published setup; `None` while pending or torn down.
pub type SetupReceiver<S> = watch::Receiver<Option<Arc<UserAudioSetup<S>>>>;

/// Acquired stream plus the negotiated encoding.
#[derive(Debug)]
pub struct UserAudioSetup<S> {
    stream: S,
    mime_type: String,
    extension: String,
}

impl<S> UserAudioSetup<S> {
    /// Bundle an acquired stream with its capture encoding.
    pub fn new(stream: S, selection: MimeSelection) -> Self {
        Self {
            stream,
            mime_type: selection.mime_type,
            extension: selection.extension,
        }
    }

    /// The live microphone stream.
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Negotiated MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File extension for the negotiated MIME type.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// Screens of the host application's flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    /// Permission and device setup.
    #[default]
    Intro,
    /// The recorder widget.
    Recording,
    /// The finished recording.
    Results,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Intro => "intro",
            Self::Recording => "recording",
            Self::Results => "results",
        };
        write!(f, "{}", name)
    }
}

/// Result of [`SetupOrchestrator::enter_stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// A setup was acquired and published.
    Ready,
    /// A setup was already published; nothing was done.
    AlreadyReady,
    /// Another acquisition is running; this call was suppressed.
    InFlight,
    /// The stage does not acquire a setup.
    Skipped,
    /// The stage changed while acquiring; the result was discarded.
    Superseded,
}

#[derive(Debug, Default)]
struct StageState {
    stage: Stage,
    generation: u64,
}

/// Acquires and owns the [`UserAudioSetup`].
pub struct SetupOrchestrator<H: MediaHost> {
    host: Arc<H>,
    candidates: Vec<String>,
    setup_tx: watch::Sender<Option<Arc<UserAudioSetup<H::Stream>>>>,
    stage: Mutex<StageState>,
    in_flight: AtomicBool,
    last_attempt_failed: AtomicBool,
}

impl<H: MediaHost> SetupOrchestrator<H> {
    /// Create an orchestrator negotiating among `candidates`, highest
    /// priority first. Starts in [`Stage::Intro`] with nothing acquired.
    pub fn new(host: Arc<H>, candidates: Vec<String>) -> Self {
        let (setup_tx, _) = watch::channel(None);

        Self {
            host,
            candidates,
            setup_tx,
            stage: Mutex::new(StageState::default()),
            in_flight: AtomicBool::new(false),
            last_attempt_failed: AtomicBool::new(false),
        }
    }

    /// Subscribe to the published setup.
    pub fn subscribe(&self) -> SetupReceiver<H::Stream> {
        self.setup_tx.subscribe()
    }

    /// The currently published setup, if any.
    pub fn current(&self) -> Option<Arc<UserAudioSetup<H::Stream>>> {
        self.setup_tx.borrow().clone()
    }

    /// Whether the most recent acquisition attempt failed.
    pub fn last_attempt_failed(&self) -> bool {
        self.last_attempt_failed.load(Ordering::Acquire)
    }

    /// Record a stage entry and, on [`Stage::Intro`], acquire the setup once.
    ///
    /// # Errors
    ///
    /// Returns the negotiation or acquisition error. The published setup
    /// stays `None` in that case.
    #[instrument(skip(self))]
    pub async fn enter_stage(&self, stage: Stage) -> CoreResult<SetupOutcome> {
        let generation = {
            let mut state = self.stage.lock().await;
            if state.stage != stage {
                debug!(from = %state.stage, to = %stage, "Stage changed");
                state.stage = stage;
                state.generation += 1;
                self.in_flight.store(false, Ordering::Release);
            }
            state.generation
        };

        if stage != Stage::Intro {
            return Ok(SetupOutcome::Skipped);
        }

        if self.setup_tx.borrow().is_some() {
            return Ok(SetupOutcome::AlreadyReady);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Setup already in flight, suppressing duplicate");
            return Ok(SetupOutcome::InFlight);
        }

        let result = self.acquire().await;

        if self.stage.lock().await.generation != generation {
            if let Ok(setup) = result {
                setup.stream().stop_tracks();
            }
            info!("Stage changed during setup, discarding result");
            return Ok(SetupOutcome::Superseded);
        }

        self.in_flight.store(false, Ordering::Release);

        match result {
            Ok(setup) => {
                info!(mime_type = %setup.mime_type(), "Audio setup ready");
                self.last_attempt_failed.store(false, Ordering::Release);
                self.setup_tx.send_replace(Some(Arc::new(setup)));
                Ok(SetupOutcome::Ready)
            }
            Err(e) => {
                error!(error = ?e, "Audio setup failed");
                self.last_attempt_failed.store(true, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Unpublish the setup and stop the stream's tracks.
    ///
    /// Returns `false` when there was nothing to release.
    #[instrument(skip(self))]
    pub fn teardown(&self) -> bool {
        match self.setup_tx.send_replace(None) {
            Some(setup) => {
                setup.stream().stop_tracks();
                info!("Audio setup torn down");
                true
            }
            None => false,
        }
    }

    async fn acquire(&self) -> CoreResult<UserAudioSetup<H::Stream>> {
        let selection = select_mime_type(self.host.as_ref(), &self.candidates)?;
        let stream = acquire_audio_stream(self.host.as_ref()).await?;

        Ok(UserAudioSetup::new(stream, selection))
    }
}
