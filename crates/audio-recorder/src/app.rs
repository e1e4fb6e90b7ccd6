use crate::{AppCommand, AppError, AppResult, config::Config, presenter};

use std::{panic::Location, sync::Arc};

use audio_recorder_core::{
    AudioRecorder, RecordedFile, RecorderIntent, RecordingOptions, SetupOrchestrator, Stage,
    media::simulated::SimulatedHost,
};
use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, error, info, instrument, warn};

/// Main application state.
///
/// Walks the intro, recording and results stages. Terminal lines arrive on
/// `command_rx` from a forwarding task; the recorder runs on its own task and
/// publishes snapshots back through a `watch` channel.
pub struct App {
    pub(crate) host: Arc<SimulatedHost>,
    pub(crate) orchestrator: Arc<SetupOrchestrator<SimulatedHost>>,
    pub(crate) options: RecordingOptions,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) last_file: Option<RecordedFile>,
}

impl App {
    pub(crate) fn new(config: &Config) -> Self {
        let host = Arc::new(SimulatedHost::new(config.host.clone()));
        let orchestrator = Arc::new(SetupOrchestrator::new(
            Arc::clone(&host),
            config.mime.candidates.clone(),
        ));
        let (command_tx, command_rx) = mpsc::channel(32);

        Self {
            host,
            orchestrator,
            options: config.recorder,
            command_tx,
            command_rx,
            last_file: None,
        }
    }

    /// Run the stage loop until the user quits or input closes.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Audio recorder starting");

        let input_tx = self.command_tx.clone();
        let input_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if input_tx.send(AppCommand::Input(line)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("Terminal input closed");
                        let _ = input_tx.send(AppCommand::Shutdown).await;
                        break;
                    }
                    Err(e) => {
                        error!(error = ?e, "Failed to read terminal input");
                        let _ = input_tx.send(AppCommand::Shutdown).await;
                        break;
                    }
                }
            }
        });

        let mut stage = Some(Stage::Intro);
        while let Some(current) = stage {
            info!(stage = %current, "Entering stage");
            stage = match current {
                Stage::Intro => self.intro().await?,
                Stage::Recording => self.recording().await?,
                Stage::Results => self.results().await?,
            };
        }

        input_handle.abort();
        self.orchestrator.teardown();
        info!("Audio recorder shut down successfully");

        Ok(())
    }

    /// Acquire the microphone, offering a retry when it fails.
    async fn intro(&mut self) -> AppResult<Option<Stage>> {
        println!("Connecting to your microphone...");

        match self.orchestrator.enter_stage(Stage::Intro).await {
            Ok(outcome) => debug!(?outcome, "Intro setup finished"),
            Err(e) => warn!(error = %e, "Microphone setup failed"),
        }

        if self.orchestrator.current().is_some() {
            println!("Microphone ready.");
            return Ok(Some(Stage::Recording));
        }

        println!("Could not connect to your microphone. Type `retry` or `quit`.");

        loop {
            match self.command_rx.recv().await {
                Some(AppCommand::Input(line)) => match line.trim() {
                    "retry" => return Ok(Some(Stage::Intro)),
                    "quit" => return Ok(None),
                    other => println!("Unknown command `{}`. Type `retry` or `quit`.", other),
                },
                Some(AppCommand::RecordFinished(_)) => {}
                Some(AppCommand::Shutdown) | None => return Ok(None),
            }
        }
    }

    /// Drive the recorder widget until a finished take is accepted.
    async fn recording(&mut self) -> AppResult<Option<Stage>> {
        self.orchestrator.enter_stage(Stage::Recording).await?;

        let finish_tx = self.command_tx.clone();
        let recorder = AudioRecorder::new(
            Arc::clone(&self.host),
            self.orchestrator.subscribe(),
            self.options,
        )
        .on_record_finish(move |file| {
            if let Err(e) = finish_tx.try_send(AppCommand::RecordFinished(file)) {
                error!(error = ?e, "Failed to deliver finished recording");
            }
        });

        let (intent_tx, intent_rx) = mpsc::channel(32);
        let (snapshot_tx, mut snapshot_rx) = watch::channel(recorder.snapshot());
        let recorder_handle = tokio::spawn(recorder.run(intent_rx, snapshot_tx));

        println!("Commands: record, stop, play, reset, next, quit");

        let auto_record = self.options.auto_record;
        let mut snapshot = snapshot_rx.borrow_and_update().clone();
        let mut rendered = presenter::render(&snapshot, auto_record);
        println!("{}", rendered);

        let mut finished: Option<RecordedFile> = None;

        let next = loop {
            tokio::select! {
                changed = snapshot_rx.changed() => {
                    if changed.is_err() {
                        warn!("Recorder stopped unexpectedly");
                        break None;
                    }

                    snapshot = snapshot_rx.borrow_and_update().clone();
                    let frame = presenter::render(&snapshot, auto_record);
                    if frame != rendered {
                        println!("{}", frame);
                        rendered = frame;
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::Input(line) => {
                            let word = line.trim();
                            match word {
                                "next"
                                    if finished.as_ref().is_some_and(|file| {
                                        presenter::is_current_take(&snapshot, &file.info())
                                    }) =>
                                {
                                    break Some(Stage::Results);
                                }
                                "quit" => break None,
                                _ => {
                                    let controls = presenter::controls(&snapshot, auto_record);
                                    match presenter::parse_command(word, &controls) {
                                        Some(intent) => {
                                            if let Err(e) = send_intent(&intent_tx, intent).await {
                                                error!(error = ?e, "Recorder is no longer listening");
                                                break None;
                                            }
                                        }
                                        None => println!("`{}` is not available right now", word),
                                    }
                                }
                            }
                        }
                        AppCommand::RecordFinished(file) => {
                            println!(
                                "Recorded {}. Type `next` to continue.",
                                presenter::file_summary(&file.info())
                            );
                            finished = Some(file);
                        }
                        AppCommand::Shutdown => break None,
                    }
                }
            }
        };

        if send_intent(&intent_tx, RecorderIntent::Shutdown).await.is_err() {
            debug!("Recorder already stopped");
        }
        if let Err(e) = recorder_handle.await {
            error!(error = ?e, "Recorder task panicked");
        }

        if matches!(next, Some(Stage::Results)) {
            self.last_file = finished;
        }

        Ok(next)
    }

    /// Show the finished take and offer another round.
    async fn results(&mut self) -> AppResult<Option<Stage>> {
        self.orchestrator.enter_stage(Stage::Results).await?;

        match &self.last_file {
            Some(file) => println!("Your recording: {}", presenter::file_summary(&file.info())),
            None => println!("No recording available."),
        }
        println!("Type `again` to record another take or `quit` to exit.");

        loop {
            match self.command_rx.recv().await {
                Some(AppCommand::Input(line)) => match line.trim() {
                    "again" => {
                        self.orchestrator.teardown();
                        self.last_file = None;
                        return Ok(Some(Stage::Intro));
                    }
                    "quit" => return Ok(None),
                    other => println!("Unknown command `{}`. Type `again` or `quit`.", other),
                },
                Some(AppCommand::RecordFinished(_)) => {}
                Some(AppCommand::Shutdown) | None => return Ok(None),
            }
        }
    }
}

#[track_caller]
fn send_intent(
    intent_tx: &mpsc::Sender<RecorderIntent>,
    intent: RecorderIntent,
) -> impl Future<Output = AppResult<()>> + '_ {
    let location = ErrorLocation::from(Location::caller());

    async move {
        intent_tx
            .send(intent)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?} to recorder: {}", intent, e),
                location,
            })
    }
}
