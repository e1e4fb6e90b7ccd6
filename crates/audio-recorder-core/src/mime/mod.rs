//! Capture encoding negotiation.
//!
//! Picks the first MIME type from a prioritized candidate list that the host
//! reports as capturable, and derives the file extension used to name
//! finished recordings.

use crate::{CoreResult, RecorderError, media::MediaHost};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// MIME types in negotiation priority order, with their file extensions.
pub const MIME_TO_EXTENSION: &[(&str, &str)] = &[
    ("audio/webm", "webm"),
    ("audio/ogg", "ogg"),
    ("audio/mpeg", "mp3"),
    ("audio/mp4", "m4a"),
    ("audio/x-m4a", "m4a"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/flac", "flac"),
    ("audio/aac", "aac"),
    ("audio/3gpp", "3gp"),
    ("audio/3gpp2", "3g2"),
    ("audio/x-aiff", "aiff"),
    ("audio/basic", "au"),
    ("audio/mid", "midi"),
    ("audio/x-mid", "midi"),
    ("audio/x-midi", "midi"),
    ("audio/x-ms-wma", "wma"),
    ("audio/x-realaudio", "ra"),
    // Video containers that also carry audio-only recordings
    ("video/webm", "webm"),
    ("video/mp4", "mp4"),
];

/// The negotiated capture encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeSelection {
    /// Selected MIME type, as listed in the candidates.
    pub mime_type: String,
    /// File extension for recordings in this encoding.
    pub extension: String,
}

/// Every known MIME type, highest priority first.
pub fn default_candidates() -> Vec<String> {
    MIME_TO_EXTENSION
        .iter()
        .map(|(mime, _)| (*mime).to_string())
        .collect()
}

/// Extension for a MIME type. Parameters such as `;codecs=opus` are ignored.
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or(mime_type)
        .trim()
        .to_ascii_lowercase();

    MIME_TO_EXTENSION
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Select the first candidate the runtime can capture.
///
/// # Errors
///
/// Returns [`RecorderError::NoSupportedFormat`] when no candidate survives.
#[track_caller]
pub fn negotiate_mime_type<F>(candidates: &[String], is_supported: F) -> CoreResult<String>
where
    F: Fn(&str) -> bool,
{
    let supported: Vec<&String> = candidates
        .iter()
        .filter(|candidate| is_supported(candidate.as_str()))
        .collect();

    debug!(
        candidate_count = candidates.len(),
        supported_count = supported.len(),
        "MIME candidates filtered"
    );

    supported
        .first()
        .map(|mime| (*mime).clone())
        .ok_or(RecorderError::NoSupportedFormat {
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Negotiate against a media host and derive the file extension.
///
/// # Errors
///
/// Returns [`RecorderError::NoSupportedFormat`] when the host supports none
/// of the candidates, or [`RecorderError::ExtensionNotFound`] when the
/// selected type has no extension mapping.
#[track_caller]
#[instrument(skip(host, candidates))]
pub fn select_mime_type<H: MediaHost>(host: &H, candidates: &[String]) -> CoreResult<MimeSelection> {
    let mime_type = negotiate_mime_type(candidates, |mime| host.is_type_supported(mime))?;

    let extension = extension_for(&mime_type).ok_or_else(|| RecorderError::ExtensionNotFound {
        mime_type: mime_type.clone(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!(mime_type = %mime_type, extension, "Capture encoding selected");

    Ok(MimeSelection {
        mime_type,
        extension: extension.to_string(),
    })
}
