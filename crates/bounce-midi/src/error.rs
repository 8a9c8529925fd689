//! Error types for the event and MIDI file layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI parse error: {0}")]
    MidiFileParse(String),

    #[error("Unsupported MIDI timing format")]
    MidiUnsupportedTiming,

    #[error("Unsupported MIDI file: {0}")]
    UnsupportedFormat(&'static str),

    #[error("Track {requested} requested but the file has {available}")]
    TrackOutOfRange { requested: usize, available: usize },
}

impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::MidiFileParse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
