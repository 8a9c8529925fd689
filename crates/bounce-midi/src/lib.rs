//! Timed events for the bounce offline host.
//!
//! Events carry absolute frame timestamps. An [`EventSequence`] hands them
//! out one processing block at a time with block-relative offsets. Sequences
//! are usually built from a Standard MIDI File via [`read_sequence`].

pub mod error;
pub use error::{Error, Result};

pub mod event;
pub use event::{meta, EventKind, TimedEvent, SYSEX_STATUS};

pub mod sequence;
pub use sequence::EventSequence;

pub mod file;
pub use file::{load_sequence, read_sequence};
