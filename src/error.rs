//! Error types for kv-attention-tour.
//!
//! The navigation core never fails; these errors only come from the
//! outer layers (terminal IO, config loading, CLI argument checks).

use thiserror::Error;

/// Result type alias for kv-attention-tour operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kv-attention-tour.
#[derive(Error, Debug)]
pub enum Error {
    /// Phase number outside 1..=3.
    #[error("invalid phase {0}: expected 1, 2 or 3")]
    InvalidPhase(u8),

    /// Track name that matches none of the walkthroughs.
    #[error("unknown track '{0}': expected prefill, decoding or no-cache")]
    UnknownTrack(String),

    /// Step index past the end of a track's catalog.
    #[error("step {step} out of range for {track} track ({len} steps)")]
    StepOutOfRange {
        track: &'static str,
        step: usize,
        len: usize,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
