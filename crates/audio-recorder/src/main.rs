//! Audio Recorder: terminal demo of the microphone recorder widget.

mod app;
mod app_command;
mod config;
mod error;
mod presenter;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use std::time::Duration;

use tracing::error;

/// Application entry point.
fn main() {
    // Logs go to stderr so the widget on stdout stays readable.
    tracing_subscriber::fmt()
        .with_env_filter("audio_recorder=debug,audio_recorder_core=debug")
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(async { App::new(&config).run().await });

    // A pending terminal read holds a blocking thread that never finishes.
    rt.shutdown_timeout(Duration::from_millis(100));

    if let Err(e) = result {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}
