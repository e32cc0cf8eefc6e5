//! Unified crate error types.

use std::time::Duration;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// A page of a later batch failed. The whole fetch is aborted and no
    /// partial graph is produced.
    #[error("Page {page} of {total_pages} failed: {source}")]
    BatchFailed {
        page: u32,
        total_pages: u32,
        #[source]
        source: HttpError,
    },

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Input rejected before any network call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Start of range ({from_ms}) must be before end ({to_ms})")]
    EmptyRange { from_ms: i64, to_ms: i64 },

    #[error("Time range of {requested:?} exceeds the maximum window of {max:?}")]
    WindowTooLarge { requested: Duration, max: Duration },

    #[error("{name} must be within {min}..={max}, got {value}")]
    SettingOutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Non-2xx from the trade-history endpoint. `message` is the remote
    /// `{"message": ...}` field when present, otherwise the status line.
    #[error("Remote error {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Simulation driver errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Simulation is not running")]
    NotRunning,

    #[error("Simulation command channel full")]
    ChannelFull,

    #[error("Unknown node: {0}")]
    UnknownNode(String),
}
