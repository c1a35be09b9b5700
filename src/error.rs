//! Error type shared by every stage of the analysis pipeline

use thiserror::Error;

/// Errors returned by configuration, the spectrum engines, audio sources and
/// report I/O.
///
/// Source exhaustion is not an error: sources signal it by reading zero
/// samples.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("bin index {bin} out of range for a transform of length {len}")]
    BinOutOfRange { bin: usize, len: usize },

    #[error("transform length {len} is not a power of two")]
    NotPowerOfTwo { len: usize },

    #[error("expected {expected} samples, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("analysis window is empty")]
    EmptyWindow,

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("malformed report at line {line}: {message}")]
    ReportParse { line: usize, message: String },

    #[error("analysis cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
