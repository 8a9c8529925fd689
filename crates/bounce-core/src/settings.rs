//! Run settings shared by buffers, codecs, the MIDI reader and the host.
//!
//! Settings are an explicit value: build one up front, validate it, and pass
//! it by reference to whatever needs it.

use crate::pcm::{BitDepth, ByteOrder};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;
pub const DEFAULT_CHANNELS: usize = 2;
pub const DEFAULT_BLOCKSIZE: usize = 512;
pub const DEFAULT_TEMPO: f64 = 120.0;

/// Beats per measure over note value, e.g. 6/8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    numerator: u32,
    denominator: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl TimeSignature {
    /// Both parts must be positive. Odd but valid values are accepted.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(Error::InvalidTimeSignature {
                numerator,
                denominator,
            });
        }

        if !(2..=12).contains(&numerator) || !matches!(denominator, 2 | 4 | 8 | 16) {
            info!("Unusual time signature {}/{}", numerator, denominator);
        }

        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// From the two leading bytes of a MIDI time signature meta event:
    /// numerator, then the denominator as a power of two.
    pub fn from_midi_bytes(bytes: [u8; 2]) -> Result<Self> {
        let denominator = 1u32
            .checked_shl(u32::from(bytes[1]))
            .ok_or(Error::InvalidTimeSignature {
                numerator: u32::from(bytes[0]),
                denominator: 0,
            })?;
        Self::new(u32::from(bytes[0]), denominator)
    }

    #[inline]
    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    #[inline]
    pub fn denominator(&self) -> u32 {
        self.denominator
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for TimeSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (numerator, denominator) = s
            .split_once('/')
            .ok_or_else(|| Error::InvalidConfig(format!("time signature '{s}' has no '/'")))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| Error::InvalidConfig(format!("time signature '{s}': {e}")))
        };

        Self::new(parse(numerator)?, parse(denominator)?)
    }
}

/// Settings for one offline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    sample_rate: f64,
    channels: usize,
    blocksize: usize,
    tempo: f64,
    time_signature: TimeSignature,
    bit_depth: BitDepth,
    byte_order: ByteOrder,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            blocksize: DEFAULT_BLOCKSIZE,
            tempo: DEFAULT_TEMPO,
            time_signature: TimeSignature::default(),
            bit_depth: BitDepth::default(),
            byte_order: ByteOrder::default(),
        }
    }
}

impl AudioSettings {
    pub fn builder() -> AudioSettingsBuilder {
        AudioSettingsBuilder::default()
    }

    /// Check every field. Useful after deserializing.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate > 0.0) || !self.sample_rate.is_finite() {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 {
            return Err(Error::InvalidChannelCount(self.channels));
        }
        if self.blocksize == 0 {
            return Err(Error::InvalidBlocksize(self.blocksize));
        }
        if !(self.tempo > 0.0) || !self.tempo.is_finite() {
            return Err(Error::InvalidTempo(self.tempo));
        }
        let sig = self.time_signature;
        if sig.numerator == 0 || sig.denominator == 0 {
            return Err(Error::InvalidTimeSignature {
                numerator: sig.numerator,
                denominator: sig.denominator,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn blocksize(&self) -> usize {
        self.blocksize
    }

    /// Beats per minute.
    #[inline]
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    #[inline]
    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    #[inline]
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<()> {
        if !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        info!("Setting sample rate to {}Hz", sample_rate);
        self.sample_rate = sample_rate;
        Ok(())
    }

    pub fn set_channels(&mut self, channels: usize) -> Result<()> {
        if channels == 0 {
            return Err(Error::InvalidChannelCount(channels));
        }
        info!("Setting {} channels", channels);
        self.channels = channels;
        Ok(())
    }

    pub fn set_blocksize(&mut self, blocksize: usize) -> Result<()> {
        if blocksize == 0 {
            return Err(Error::InvalidBlocksize(blocksize));
        }
        info!("Setting blocksize to {}", blocksize);
        self.blocksize = blocksize;
        Ok(())
    }

    pub fn set_tempo(&mut self, tempo: f64) -> Result<()> {
        if !(tempo > 0.0) || !tempo.is_finite() {
            return Err(Error::InvalidTempo(tempo));
        }
        info!("Setting tempo to {} BPM", tempo);
        self.tempo = tempo;
        Ok(())
    }

    /// Set the tempo from a MIDI set-tempo payload (microseconds per beat,
    /// 24-bit big-endian).
    pub fn set_tempo_from_midi_bytes(&mut self, bytes: [u8; 3]) -> Result<()> {
        let micros = (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2]);
        if micros == 0 {
            return Err(Error::InvalidTempo(f64::INFINITY));
        }
        self.set_tempo(60_000_000.0 / f64::from(micros))
    }

    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        info!("Setting time signature to {}", time_signature);
        self.time_signature = time_signature;
    }

    pub fn set_time_signature_from_midi_bytes(&mut self, bytes: [u8; 2]) -> Result<()> {
        self.set_time_signature(TimeSignature::from_midi_bytes(bytes)?);
        Ok(())
    }

    pub fn set_bit_depth(&mut self, bit_depth: BitDepth) {
        info!("Setting bit depth to {}", bit_depth.bits());
        self.bit_depth = bit_depth;
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Audio frames per MIDI tick at the current tempo and sample rate.
    pub fn frames_per_tick(&self, ticks_per_beat: u16) -> f64 {
        self.sample_rate * 60.0 / (f64::from(ticks_per_beat) * self.tempo)
    }
}

/// Builder for [`AudioSettings`]. Unset fields keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct AudioSettingsBuilder {
    settings: AudioSettings,
}

impl AudioSettingsBuilder {
    /// Default: 44100.0
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.settings.sample_rate = sample_rate;
        self
    }

    /// Default: 2
    pub fn channels(mut self, channels: usize) -> Self {
        self.settings.channels = channels;
        self
    }

    /// Default: 512
    pub fn blocksize(mut self, blocksize: usize) -> Self {
        self.settings.blocksize = blocksize;
        self
    }

    /// Default: 120.0
    pub fn tempo(mut self, tempo: f64) -> Self {
        self.settings.tempo = tempo;
        self
    }

    /// Default: 4/4
    pub fn time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.settings.time_signature = time_signature;
        self
    }

    /// Default: 16-bit
    pub fn bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.settings.bit_depth = bit_depth;
        self
    }

    /// Default: little-endian
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.settings.byte_order = byte_order;
        self
    }

    pub fn build(self) -> Result<AudioSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
