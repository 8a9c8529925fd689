//! Core types for the bounce offline host.
//!
//! Non-interleaved sample buffers, PCM conversion for 8/16/24-bit integer and
//! 32-bit float data in either byte order, run settings and the transport
//! clock.

pub mod error;
pub use error::{Error, Result};

pub mod endian;

pub mod buffer;
pub use buffer::{Sample, SampleBuffer};

pub mod pcm;
pub use pcm::{BitDepth, ByteOrder, Float32, Pcm16, Pcm24, Pcm8, PcmBuffer, PcmCodec, PcmFormat};

pub mod settings;
pub use settings::{AudioSettings, AudioSettingsBuilder, TimeSignature};

pub mod clock;
pub use clock::AudioClock;
