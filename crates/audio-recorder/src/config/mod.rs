#[allow(clippy::module_inception)]
mod config;
mod mime_config;

pub(crate) use {
    config::{Config, MAX_BYTES_PER_SECOND},
    mime_config::MimeConfig,
};
