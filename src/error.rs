//! Centralized error type for the bounce umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] bounce_core::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] bounce_midi::Error),

    #[error("Processor: {0}")]
    Processor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
