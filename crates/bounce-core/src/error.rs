//! Error types for bounce-core.

use thiserror::Error;

/// Error type for bounce-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unsupported bit depth: {0}. Must be 8, 16, 24 or 32")]
    UnsupportedBitDepth(u16),

    #[error("Cannot create a buffer with {channels} channels and blocksize {blocksize}")]
    EmptyBuffer { channels: usize, blocksize: usize },

    #[error(
        "Buffer dimensions mismatch: expected {} channels x {} frames, got {} x {}",
        expected.0, expected.1, actual.0, actual.1
    )]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("PCM byte length mismatch: expected {expected}, got {actual}")]
    ByteLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid sample rate: {0}. Must be positive")]
    InvalidSampleRate(f64),

    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(usize),

    #[error("Invalid blocksize: {0}")]
    InvalidBlocksize(usize),

    #[error("Invalid tempo: {0}. Must be positive")]
    InvalidTempo(f64),

    #[error("Invalid time signature: {numerator}/{denominator}")]
    InvalidTimeSignature { numerator: u32, denominator: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
