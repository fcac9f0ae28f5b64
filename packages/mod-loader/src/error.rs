use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModLoaderError {
    #[error("Malformed manifest envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Apply failed: {0}")]
    Apply(#[from] ApplyError),

    #[error("Ready signal failed: {0}")]
    Ready(#[from] ReadyError),
}

/// Transport-level failures while retrieving an entry resource. A response
/// with a non-success status is not an error at this level.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unsupported scheme in '{0}'")]
    UnsupportedScheme(String),

    #[error("Response body is not valid UTF-8: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Failures while applying a fetched payload to the live UI.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("Container '{0}' not found")]
    MissingContainer(String),

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Host panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadyError {
    #[error("'{event}' did not fire within {after:?}")]
    TimedOut { event: String, after: Duration },

    #[error("Wait for '{0}' was cancelled")]
    Cancelled(String),

    #[error("Event bus closed while waiting for '{0}'")]
    BusClosed(String),
}
