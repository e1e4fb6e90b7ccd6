//! Deterministic in-process media host.
//!
//! Produces synthetic audio bytes at a configured rate and replays
//! end-of-media notifications on the tokio clock, so recorder behaviour can
//! be exercised without a device (and with paused time in tests).

use crate::{
    media::{CaptureRecorder, CaptureSink, HostError, MediaHost, MediaStream, Playback, PlaybackSink},
    recorder::RecordedFile,
};

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};

/// Whether the simulated microphone can be opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MicrophoneAvailability {
    /// Stream requests succeed.
    #[default]
    Available,
    /// Stream requests fail with a permission error.
    Denied,
    /// Stream requests fail with a device error.
    Unavailable,
}

/// Behaviour of a [`SimulatedHost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedHostConfig {
    /// Whether the environment reports recording capability.
    pub recording_supported: bool,
    /// MIME types reported as capturable.
    pub supported_mime_types: Vec<String>,
    /// Outcome of stream requests.
    pub microphone: MicrophoneAvailability,
    /// Simulated permission prompt latency.
    pub acquire_delay_ms: u64,
    /// Synthetic audio produced per second of capture.
    pub bytes_per_second: usize,
    /// Size of each delivered chunk.
    pub chunk_size: usize,
}

impl Default for SimulatedHostConfig {
    fn default() -> Self {
        Self {
            recording_supported: true,
            supported_mime_types: vec!["audio/webm".to_string(), "audio/ogg".to_string()],
            microphone: MicrophoneAvailability::Available,
            acquire_delay_ms: 0,
            bytes_per_second: 16_000,
            chunk_size: 4_096,
        }
    }
}

/// In-process [`MediaHost`] driven by [`SimulatedHostConfig`].
#[derive(Debug, Default)]
pub struct SimulatedHost {
    config: SimulatedHostConfig,
    stream_requests: AtomicUsize,
    streams: Mutex<Vec<Arc<AtomicBool>>>,
    active_capture: Mutex<Option<Arc<Mutex<CaptureState>>>>,
}

impl SimulatedHost {
    /// Create a host with the given behaviour.
    pub fn new(config: SimulatedHostConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Number of stream requests received so far.
    pub fn stream_requests(&self) -> usize {
        self.stream_requests.load(Ordering::Acquire)
    }

    /// Number of handed-out streams whose tracks are still live.
    pub fn live_streams(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|live| live.load(Ordering::Acquire))
            .count()
    }

    /// Make the most recently created capture session report an error.
    ///
    /// Returns `false` when no capture session was ever created.
    pub fn inject_capture_error(&self, message: &str) -> bool {
        match self.active_capture() {
            Some(state) => {
                let state = state.lock().unwrap_or_else(PoisonError::into_inner);
                warn!(session_id = %state.sink.session_id(), message, "Injecting capture error");
                state.sink.error(message);
                true
            }
            None => false,
        }
    }

    /// End the most recently created capture session from the host side,
    /// flushing its data as a regular stop would.
    ///
    /// Returns `false` when no capture session is currently capturing.
    pub fn inject_capture_stop(&self) -> bool {
        let Some(state) = self.active_capture() else {
            return false;
        };
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);

        warn!(session_id = %state.sink.session_id(), "Injecting host-side capture stop");
        state.flush().is_ok()
    }

    fn active_capture(&self) -> Option<Arc<Mutex<CaptureState>>> {
        self.active_capture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MediaHost for SimulatedHost {
    type Stream = SimulatedStream;
    type Recorder = SimulatedRecorder;
    type Player = SimulatedPlayer;

    fn is_recording_supported(&self) -> bool {
        self.config.recording_supported
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.config
            .supported_mime_types
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(mime_type))
    }

    async fn request_audio_stream(&self) -> Result<SimulatedStream, HostError> {
        self.stream_requests.fetch_add(1, Ordering::AcqRel);

        if self.config.acquire_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.acquire_delay_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }

        match self.config.microphone {
            MicrophoneAvailability::Available => {
                let live = Arc::new(AtomicBool::new(true));
                self.streams
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(Arc::clone(&live));
                Ok(SimulatedStream { live })
            }
            MicrophoneAvailability::Denied => Err(HostError::PermissionDenied(
                "microphone access was refused".to_string(),
            )),
            MicrophoneAvailability::Unavailable => Err(HostError::DeviceUnavailable(
                "no audio input device found".to_string(),
            )),
        }
    }

    fn create_recorder(
        &self,
        stream: &SimulatedStream,
        mime_type: &str,
        sink: CaptureSink,
    ) -> Result<SimulatedRecorder, HostError> {
        if !self.is_type_supported(mime_type) {
            return Err(HostError::NotSupported(format!(
                "cannot capture {}",
                mime_type
            )));
        }

        let state = Arc::new(Mutex::new(CaptureState {
            sink,
            started_at: None,
            bytes_per_second: self.config.bytes_per_second,
            chunk_size: self.config.chunk_size.max(1),
        }));

        *self
            .active_capture
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&state));

        Ok(SimulatedRecorder {
            state,
            stream_live: Arc::clone(&stream.live),
        })
    }

    fn create_player(
        &self,
        file: &RecordedFile,
        sink: PlaybackSink,
    ) -> Result<SimulatedPlayer, HostError> {
        debug!(name = %file.name(), size = file.size(), "Simulated player prepared");

        Ok(SimulatedPlayer {
            sink,
            duration: Duration::from_secs(u64::from(file.duration_secs())),
            position: Duration::ZERO,
            started_at: None,
            end_task: None,
            released: false,
        })
    }
}

/// Simulated microphone stream.
#[derive(Debug)]
pub struct SimulatedStream {
    live: Arc<AtomicBool>,
}

impl MediaStream for SimulatedStream {
    fn stop_tracks(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            info!("Simulated stream tracks stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Capture state shared between a [`SimulatedRecorder`] and its host.
#[derive(Debug)]
struct CaptureState {
    sink: CaptureSink,
    started_at: Option<Instant>,
    bytes_per_second: usize,
    chunk_size: usize,
}

impl CaptureState {
    /// Deliver the synthetic bytes for the elapsed time, a trailing empty
    /// chunk, then the stop notification.
    fn flush(&mut self) -> Result<(), HostError> {
        let started_at = self
            .started_at
            .take()
            .ok_or_else(|| HostError::Failed("recorder is not capturing".to_string()))?;

        let elapsed_ms = usize::try_from(started_at.elapsed().as_millis()).unwrap_or(usize::MAX);
        let total = elapsed_ms.saturating_mul(self.bytes_per_second) / 1_000;

        let mut delivered = 0;
        while delivered < total {
            let len = self.chunk_size.min(total - delivered);
            let chunk = (delivered..delivered + len).map(|i| (i % 251) as u8).collect();
            self.sink.data_available(chunk);
            delivered += len;
        }

        // Real encoders commonly flush a trailing empty chunk.
        self.sink.data_available(Vec::new());
        self.sink.stopped();

        debug!(bytes = total, "Simulated capture flushed");

        Ok(())
    }
}

/// Simulated capture session producing synthetic bytes.
#[derive(Debug)]
pub struct SimulatedRecorder {
    state: Arc<Mutex<CaptureState>>,
    stream_live: Arc<AtomicBool>,
}

impl CaptureRecorder for SimulatedRecorder {
    fn start(&mut self) -> Result<(), HostError> {
        if !self.stream_live.load(Ordering::Acquire) {
            return Err(HostError::Failed("stream has no live tracks".to_string()));
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.started_at.is_some() {
            return Err(HostError::Failed("recorder is already capturing".to_string()));
        }

        state.started_at = Some(Instant::now());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HostError> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

/// Simulated playback of a recorded file.
#[derive(Debug)]
pub struct SimulatedPlayer {
    sink: PlaybackSink,
    duration: Duration,
    position: Duration,
    started_at: Option<Instant>,
    end_task: Option<JoinHandle<()>>,
    released: bool,
}

impl SimulatedPlayer {
    fn schedule_end(&mut self) {
        if let Some(task) = self.end_task.take() {
            task.abort();
        }

        let remaining = self.duration.saturating_sub(self.position);
        let sink = self.sink.clone();
        self.started_at = Some(Instant::now());
        self.end_task = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            sink.ended();
        }));
    }
}

#[async_trait]
impl Playback for SimulatedPlayer {
    async fn play(&mut self) -> Result<(), HostError> {
        if self.released {
            return Err(HostError::Failed("player was released".to_string()));
        }
        if self.end_task.is_none() {
            self.schedule_end();
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(task) = self.end_task.take() {
            task.abort();
        }
        if let Some(started_at) = self.started_at.take() {
            self.position = (self.position + started_at.elapsed()).min(self.duration);
        }
    }

    fn seek(&mut self, position_secs: f64) {
        let playing = self.end_task.is_some();
        self.pause();
        self.position = Duration::try_from_secs_f64(position_secs.max(0.0))
            .unwrap_or(self.duration)
            .min(self.duration);
        if playing {
            self.schedule_end();
        }
    }

    fn release(&mut self) {
        self.pause();
        self.released = true;
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        if let Some(task) = self.end_task.take() {
            task.abort();
        }
    }
}
