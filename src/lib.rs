//! # Bounce - Offline Audio Host
//!
//! Streams raw PCM and timed MIDI events through a processor one block at a
//! time and writes the result back out as PCM.
//!
//! ## Architecture
//!
//! Bounce is an umbrella crate that coordinates:
//! - **bounce-core** - Sample buffers, PCM codec, run settings, audio clock
//! - **bounce-midi** - Timed events, block-window event sequences, MIDI file reading
//!
//! ## Quick Start
//!
//! ```ignore
//! use bounce::prelude::*;
//!
//! let settings = AudioSettings::builder()
//!     .channels(2)
//!     .blocksize(512)
//!     .build()?;
//!
//! let sequence = bounce::midi::load_sequence("song.mid", 0, &settings)?;
//! let format = StreamFormat::from(&settings);
//!
//! let mut host = OfflineHost::new(settings, Gain::from_db(-6.0)).with_sequence(sequence);
//! let stats = host.render(input, format, output, format)?;
//! ```

/// Re-export of bounce-core for direct access
pub use bounce_core as core;

/// Re-export of bounce-midi for direct access
pub use bounce_midi as midi;

pub use bounce_core::{
    AudioClock, AudioSettings, AudioSettingsBuilder, BitDepth, ByteOrder, PcmBuffer, PcmCodec,
    PcmFormat, Sample, SampleBuffer, TimeSignature,
};
pub use bounce_midi::{EventKind, EventSequence, TimedEvent};

pub mod error;
pub use error::{Error, Result};

pub mod processor;
pub use processor::{Gain, Limiter, Passthru, Processor, Silence};

pub mod host;
pub use host::{OfflineHost, RenderStats, StreamFormat};

pub mod prelude {
    pub use crate::{
        AudioSettings, BitDepth, ByteOrder, EventSequence, Gain, Limiter, OfflineHost, Passthru,
        Processor, RenderStats, SampleBuffer, Silence, StreamFormat, TimedEvent,
    };
}
