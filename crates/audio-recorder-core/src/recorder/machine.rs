use crate::{
    CoreResult, RecorderError,
    media::{
        CaptureEvent, CaptureRecorder, CaptureSink, MediaHost, MediaStream, Playback,
        PlaybackEvent, PlaybackSink,
    },
    recorder::{
        RecordedFile, RecorderEvent, RecorderIntent, RecorderSnapshot, RecorderStatus,
        RecordingOptions, StatusFlags, UNSUPPORTED_RECORDING_MESSAGE, ticker::Ticker,
    },
    setup::{SetupReceiver, UserAudioSetup},
    timing::{self, TimeCount},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Called once per completed recording with the composed file.
pub type FinishCallback = Box<dyn FnMut(RecordedFile) + Send>;

/// Capture in progress, from `start_recording` until the host confirms the
/// stop.
struct CaptureSession<R> {
    id: Uuid,
    recorder: R,
    chunks: Vec<Vec<u8>>,
    mime_type: String,
    extension: String,
    stopping: bool,
}

struct PlayerHandle<P> {
    id: Uuid,
    player: P,
}

/// Recording and playback state machine.
///
/// ```text
/// Idle      --start_recording--> Recording
/// Recording --stop_recording---> Stopped    (also on reaching max_length)
/// Stopped   --start_playing----> Playing
/// Playing   --stop_playing-----> Stopped    (also when playback ends)
/// any       --reset_recording--> Idle
/// ```
///
/// All transitions run on the task that owns the recorder. Host
/// notifications and ticks are queued and applied by [`step`](Self::step),
/// [`drain_pending`](Self::drain_pending) or [`run`](Self::run).
pub struct AudioRecorder<H: MediaHost> {
    host: Arc<H>,
    setup: SetupReceiver<H::Stream>,
    options: RecordingOptions,
    on_record_finish: Option<FinishCallback>,

    status: RecorderStatus,
    recorded_file: Option<RecordedFile>,
    recorded_file_duration: Option<u32>,
    current_time: u32,

    capture: Option<CaptureSession<H::Recorder>>,
    player: Option<PlayerHandle<H::Player>>,
    ticker: Option<Ticker>,
    next_ticker_id: u64,
    auto_record_fired: bool,

    events_tx: mpsc::UnboundedSender<RecorderEvent>,
    events_rx: mpsc::UnboundedReceiver<RecorderEvent>,
}

impl<H: MediaHost> AudioRecorder<H> {
    /// Create an idle recorder reading its stream from `setup`.
    pub fn new(host: Arc<H>, setup: SetupReceiver<H::Stream>, options: RecordingOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            host,
            setup,
            options,
            on_record_finish: None,
            status: RecorderStatus::Idle,
            recorded_file: None,
            recorded_file_duration: None,
            current_time: 0,
            capture: None,
            player: None,
            ticker: None,
            next_ticker_id: 0,
            auto_record_fired: false,
            events_tx,
            events_rx,
        }
    }

    /// Register the callback invoked with every finished recording.
    pub fn on_record_finish<F>(mut self, callback: F) -> Self
    where
        F: FnMut(RecordedFile) + Send + 'static,
    {
        self.on_record_finish = Some(Box::new(callback));
        self
    }

    /// Current status.
    pub fn status(&self) -> &RecorderStatus {
        &self.status
    }

    /// Boolean view of the current status.
    pub fn status_flags(&self) -> StatusFlags {
        self.status.flags()
    }

    /// The finished recording, if any.
    pub fn recorded_file(&self) -> Option<&RecordedFile> {
        self.recorded_file.as_ref()
    }

    /// Elapsed seconds snapshotted when recording stopped.
    pub fn recorded_file_duration(&self) -> Option<u32> {
        self.recorded_file_duration
    }

    /// Elapsed seconds in the current phase.
    pub fn current_time(&self) -> u32 {
        self.current_time
    }

    /// Options this recorder was created with.
    pub fn options(&self) -> RecordingOptions {
        self.options
    }

    /// Timer display for the current state.
    pub fn time_count(&self) -> Option<TimeCount> {
        let max_length = f64::from(self.options.max_length);

        timing::derive_display_time(
            &self.status,
            f64::from(self.current_time),
            max_length,
            timing::is_ascending(&self.status, max_length),
        )
    }

    /// Progress indicator for the current state.
    pub fn progress_percent(&self) -> f64 {
        timing::derive_progress_percent(
            &self.status,
            f64::from(self.current_time),
            f64::from(self.options.max_length),
            self.recorded_file_duration.map(f64::from),
        )
    }

    /// Everything the presentation layer renders.
    pub fn snapshot(&self) -> RecorderSnapshot {
        RecorderSnapshot {
            status: self.status.clone(),
            flags: self.status.flags(),
            current_time: self.current_time,
            recorded_file_duration: self.recorded_file_duration,
            progress_percent: self.progress_percent(),
            time_count: self.time_count(),
            recorded_file: self.recorded_file.as_ref().map(RecordedFile::info),
        }
    }

    /// Open a capture session on the published stream.
    ///
    /// Moves to `Error` instead when the host cannot record at all.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::InvalidTransition`] unless idle,
    /// [`RecorderError::MissingStream`] without a live stream, and
    /// [`RecorderError::Host`] when the host refuses to start capture.
    #[track_caller]
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn start_recording(&mut self) -> CoreResult<()> {
        if !self.status.flags().is_idle {
            return Err(self.invalid_transition("start recording"));
        }

        if !self.host.is_recording_supported() {
            warn!("Host has no recording capability");
            self.transition(RecorderStatus::Error {
                message: UNSUPPORTED_RECORDING_MESSAGE.to_string(),
            });
            return Ok(());
        }

        let setup = self
            .active_setup()
            .ok_or(RecorderError::MissingStream {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let session_id = Uuid::new_v4();
        let sink = CaptureSink::new(session_id, self.events_tx.clone());
        let mut recorder = self
            .host
            .create_recorder(setup.stream(), setup.mime_type(), sink)?;
        recorder.start()?;

        self.capture = Some(CaptureSession {
            id: session_id,
            recorder,
            chunks: Vec::new(),
            mime_type: setup.mime_type().to_string(),
            extension: setup.extension().to_string(),
            stopping: false,
        });
        self.current_time = 0;
        self.transition(RecorderStatus::Recording);

        info!(session_id = %session_id, mime_type = %setup.mime_type(), "Recording started");

        Ok(())
    }

    /// Ask the host to stop capturing and move to `Stopped`.
    ///
    /// The elapsed time is snapshotted here, not when the host confirms the
    /// stop, so ticks during finalisation are never counted.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::NoCaptureSession`] without an open session
    /// and [`RecorderError::Host`] when the host refuses to stop.
    #[track_caller]
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn stop_recording(&mut self) -> CoreResult<()> {
        let session = self
            .capture
            .as_mut()
            .filter(|session| !session.stopping)
            .ok_or(RecorderError::NoCaptureSession {
                location: ErrorLocation::from(Location::caller()),
            })?;

        session.recorder.stop()?;
        session.stopping = true;
        let session_id = session.id;

        self.recorded_file_duration = Some(self.current_time);
        self.transition(RecorderStatus::Stopped);

        info!(
            session_id = %session_id,
            duration_secs = self.current_time,
            "Recording stopped"
        );

        Ok(())
    }

    /// Play the recorded file from the start.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::NoPlaybackHandle`] before a file exists,
    /// [`RecorderError::InvalidTransition`] unless stopped, and
    /// [`RecorderError::Host`] when the host cannot start playback.
    #[instrument(skip(self), fields(status = %self.status))]
    pub async fn start_playing(&mut self) -> CoreResult<()> {
        if self.player.is_none() {
            return Err(RecorderError::NoPlaybackHandle {
                action: "start playing",
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if !self.status.flags().is_stopped {
            return Err(self.invalid_transition("start playing"));
        }

        if let Some(handle) = self.player.as_mut() {
            handle.player.play().await?;
        }
        self.current_time = 0;
        self.transition(RecorderStatus::Playing);

        info!("Playback started");

        Ok(())
    }

    /// Pause and rewind playback, moving to `Stopped`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::NoPlaybackHandle`] before a file exists.
    #[track_caller]
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn stop_playing(&mut self) -> CoreResult<()> {
        let handle = self
            .player
            .as_mut()
            .ok_or(RecorderError::NoPlaybackHandle {
                action: "stop playing",
                location: ErrorLocation::from(Location::caller()),
            })?;

        handle.player.pause();
        handle.player.seek(0.0);
        self.transition(RecorderStatus::Stopped);

        info!(elapsed = self.current_time, "Playback stopped");

        Ok(())
    }

    /// Discard the recording and return to `Idle` from any status.
    ///
    /// Stops an open capture session and releases the playback handle. The
    /// stream itself stays live; releasing it is the setup orchestrator's
    /// job.
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn reset_recording(&mut self) {
        self.ticker = None;

        if let Some(mut session) = self.capture.take()
            && !session.stopping
            && let Err(e) = session.recorder.stop()
        {
            warn!(session_id = %session.id, error = ?e, "Failed to stop discarded capture session");
        }

        if let Some(mut handle) = self.player.take() {
            handle.player.pause();
            handle.player.release();
        }

        self.recorded_file = None;
        self.recorded_file_duration = None;
        self.current_time = 0;
        self.transition(RecorderStatus::Idle);

        debug!("Recording reset");
    }

    /// Start recording if auto-record is on and the recorder just became
    /// idle with a stream available.
    ///
    /// Fires at most once per entry into `Idle`. Returns whether recording
    /// was started.
    ///
    /// # Errors
    ///
    /// Propagates [`start_recording`](Self::start_recording) failures.
    pub fn poll_auto_record(&mut self) -> CoreResult<bool> {
        if !self.options.auto_record || self.auto_record_fired || !self.status.flags().is_idle {
            return Ok(false);
        }
        if self.active_setup().is_none() {
            debug!("Auto-record waiting for audio setup");
            return Ok(false);
        }

        self.auto_record_fired = true;
        info!("Auto-record starting");
        self.start_recording()?;

        Ok(true)
    }

    /// Wait for the next queued notification or tick and apply it.
    pub async fn step(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.handle_event(event);
        }
    }

    /// Apply every notification already queued, without waiting.
    pub fn drain_pending(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Drive the recorder until `Shutdown` or until `intents` closes.
    ///
    /// Publishes a snapshot after every handled intent, notification, tick or
    /// setup change. The recorder is reset on exit.
    #[instrument(skip_all)]
    pub async fn run(
        mut self,
        mut intents: mpsc::Receiver<RecorderIntent>,
        snapshots: watch::Sender<RecorderSnapshot>,
    ) {
        let mut setup_rx = self.setup.clone();

        info!("Recorder event loop started");
        self.auto_record();
        snapshots.send_replace(self.snapshot());

        loop {
            tokio::select! {
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event);
                }

                intent = intents.recv() => {
                    match intent {
                        Some(RecorderIntent::Shutdown) | None => {
                            info!("Recorder shutdown requested");
                            break;
                        }
                        Some(intent) => {
                            if let Err(e) = self.apply(intent).await {
                                error!(?intent, error = ?e, "Recorder intent failed");
                            }
                        }
                    }
                }

                Ok(()) = setup_rx.changed() => {
                    debug!(ready = setup_rx.borrow().is_some(), "Audio setup changed");
                }
            }

            self.auto_record();
            snapshots.send_replace(self.snapshot());
        }

        self.reset_recording();
        snapshots.send_replace(self.snapshot());
        info!("Recorder event loop stopped");
    }

    /// Apply one user intent.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the matching operation.
    pub async fn apply(&mut self, intent: RecorderIntent) -> CoreResult<()> {
        match intent {
            RecorderIntent::StartRecording => self.start_recording(),
            RecorderIntent::StopRecording => self.stop_recording(),
            RecorderIntent::StartPlaying => self.start_playing().await,
            RecorderIntent::StopPlaying => self.stop_playing(),
            RecorderIntent::Reset => {
                self.reset_recording();
                Ok(())
            }
            RecorderIntent::Shutdown => Ok(()),
        }
    }

    fn auto_record(&mut self) {
        if let Err(e) = self.poll_auto_record() {
            error!(error = ?e, "Auto-record failed to start");
        }
    }

    fn handle_event(&mut self, event: RecorderEvent) {
        match event {
            RecorderEvent::Tick { ticker_id } => self.handle_tick(ticker_id),
            RecorderEvent::Capture { session_id, event } => {
                self.handle_capture_event(session_id, event)
            }
            RecorderEvent::Playback { player_id, event } => {
                self.handle_playback_event(player_id, event)
            }
        }
    }

    fn handle_tick(&mut self, ticker_id: u64) {
        if self.ticker.as_ref().map(Ticker::id) != Some(ticker_id) {
            debug!(ticker_id, "Ignoring stale tick");
            return;
        }

        self.current_time += 1;

        let max_length = self.options.max_length;
        if self.status.flags().is_recording && max_length > 0 && self.current_time >= max_length {
            info!(max_length, "Recording limit reached");
            if let Err(e) = self.stop_recording() {
                error!(error = ?e, "Auto-stop failed");
            }
        }
    }

    fn handle_capture_event(&mut self, session_id: Uuid, event: CaptureEvent) {
        let Some(session) = self.capture.as_mut().filter(|s| s.id == session_id) else {
            debug!(session_id = %session_id, "Ignoring event from discarded capture session");
            return;
        };

        match event {
            CaptureEvent::Data(chunk) => {
                if !chunk.is_empty() {
                    session.chunks.push(chunk);
                }
            }
            CaptureEvent::Stopped => {
                if !session.stopping {
                    // Host ended capture on its own.
                    warn!(session_id = %session_id, "Capture stopped by host");
                    self.recorded_file_duration = Some(self.current_time);
                    self.transition(RecorderStatus::Stopped);
                }
                self.finish_capture();
            }
            CaptureEvent::Error(message) => {
                error!(session_id = %session_id, message = %message, "Capture failed");
                self.capture = None;
                self.transition(RecorderStatus::Error { message });
            }
        }
    }

    fn finish_capture(&mut self) {
        let Some(session) = self.capture.take() else {
            return;
        };

        let file = RecordedFile::compose(
            session.chunks,
            &session.mime_type,
            &session.extension,
            self.recorded_file_duration.unwrap_or(self.current_time),
        );

        let player_id = Uuid::new_v4();
        let sink = PlaybackSink::new(player_id, self.events_tx.clone());
        match self.host.create_player(&file, sink) {
            Ok(player) => self.player = Some(PlayerHandle { id: player_id, player }),
            Err(e) => error!(name = %file.name(), error = ?e, "Failed to prepare playback"),
        }

        info!(
            session_id = %session.id,
            name = %file.name(),
            size = file.size(),
            duration_secs = file.duration_secs(),
            "Recording finished"
        );

        self.recorded_file = Some(file.clone());

        if let Some(callback) = self.on_record_finish.as_mut() {
            callback(file);
        }
    }

    fn handle_playback_event(&mut self, player_id: Uuid, event: PlaybackEvent) {
        let current = self.player.as_ref().map(|handle| handle.id);
        if current != Some(player_id) || !self.status.flags().is_playing {
            debug!(player_id = %player_id, "Ignoring event from inactive player");
            return;
        }

        match event {
            PlaybackEvent::Ended => {
                debug!("Playback ended");
                if let Err(e) = self.stop_playing() {
                    error!(error = ?e, "Failed to stop finished playback");
                }
            }
        }
    }

    /// The single place status changes. Keeps the ticker tied to the timed
    /// statuses: recreated on every entry, dropped on every exit.
    fn transition(&mut self, next: RecorderStatus) {
        debug!(from = %self.status, to = %next, "Status transition");

        self.ticker = None;
        if next.is_timed() {
            self.next_ticker_id += 1;
            self.ticker = Some(Ticker::spawn(self.next_ticker_id, self.events_tx.clone()));
        }
        if next.flags().is_idle {
            self.auto_record_fired = false;
        }

        self.status = next;
    }

    fn active_setup(&self) -> Option<Arc<UserAudioSetup<H::Stream>>> {
        self.setup
            .borrow()
            .as_ref()
            .filter(|setup| setup.stream().is_live())
            .cloned()
    }

    #[track_caller]
    fn invalid_transition(&self, action: &'static str) -> RecorderError {
        RecorderError::InvalidTransition {
            action,
            status: self.status.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
