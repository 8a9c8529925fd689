//! Test helpers and fixtures for bounce integration tests.
//!
//! Raw PCM is built and inspected by hand here, independently of the codec
//! under test, so the host is checked against plain `to_le_bytes` /
//! `from_be_bytes` conversions.

#![allow(dead_code)]

pub mod tolerances;

use bounce::prelude::*;
use std::sync::{Arc, Mutex};

pub const TEST_SAMPLE_RATE: f64 = 48000.0;

pub const TEST_BLOCKSIZE: usize = 256;

pub fn test_settings(channels: usize) -> AudioSettings {
    AudioSettings::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .channels(channels)
        .blocksize(TEST_BLOCKSIZE)
        .build()
        .expect("Failed to build test settings")
}

pub fn float32_le() -> StreamFormat {
    StreamFormat::new(BitDepth::Float32, ByteOrder::LittleEndian)
}

pub fn int16_le() -> StreamFormat {
    StreamFormat::new(BitDepth::Int16, ByteOrder::LittleEndian)
}

pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Interleave equal-length channels into frames.
pub fn interleave(channels: &[Vec<f32>]) -> Vec<f32> {
    let frames = channels.first().map_or(0, |c| c.len());
    (0..frames)
        .flat_map(|i| channels.iter().map(move |c| c[i]))
        .collect()
}

pub fn to_f32_le_bytes(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn from_f32_le_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

pub fn to_i16_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn from_i16_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Signed 24-bit values from packed big-endian triples.
pub fn from_i24_be_bytes(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(3)
        .map(|b| i32::from_be_bytes([b[0], b[1], b[2], 0]) >> 8)
        .collect()
}

/// Assemble a single-track SMF image.
pub fn smf_format0(ticks_per_beat: u16, track: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"MThd");
    data.extend_from_slice(&6u32.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&1u16.to_be_bytes());
    data.extend_from_slice(&ticks_per_beat.to_be_bytes());
    data.extend_from_slice(b"MTrk");
    data.extend_from_slice(&(track.len() as u32).to_be_bytes());
    data.extend_from_slice(track);
    data
}

pub fn sequence_at(timestamps: &[u64]) -> EventSequence {
    timestamps
        .iter()
        .map(|&t| TimedEvent::note_on(t, 0, 60, 100))
        .collect()
}

/// Records the events of every block and outputs silence.
#[derive(Clone, Default)]
pub struct EventRecorder {
    pub blocks: Arc<Mutex<Vec<Vec<TimedEvent>>>>,
}

impl EventRecorder {
    pub fn recorded(&self) -> Vec<Vec<TimedEvent>> {
        self.blocks.lock().unwrap().clone()
    }
}

impl Processor for EventRecorder {
    fn name(&self) -> &str {
        "event-recorder"
    }

    fn process_events(&mut self, events: &[TimedEvent]) {
        self.blocks.lock().unwrap().push(events.to_vec());
    }

    fn process(&mut self, _input: &SampleBuffer, output: &mut SampleBuffer) -> bounce::Result<()> {
        output.clear();
        Ok(())
    }
}

/// Outputs `level` on every channel while a note is held, switching at the
/// exact frame of each note event.
pub struct Gate {
    level: f32,
    open: bool,
    pending: Vec<TimedEvent>,
}

impl Gate {
    pub fn new(level: f32) -> Self {
        Self {
            level,
            open: false,
            pending: Vec::new(),
        }
    }
}

impl Processor for Gate {
    fn name(&self) -> &str {
        "gate"
    }

    fn process_events(&mut self, events: &[TimedEvent]) {
        self.pending = events.to_vec();
    }

    fn process(&mut self, _input: &SampleBuffer, output: &mut SampleBuffer) -> bounce::Result<()> {
        let mut pending = self.pending.drain(..).peekable();
        for frame in 0..output.blocksize() {
            while let Some(event) = pending.next_if(|e| e.delta_frames == frame) {
                if event.is_note_on() {
                    self.open = true;
                } else if event.is_note_off() {
                    self.open = false;
                }
            }
            let value = if self.open { self.level } else { 0.0 };
            for channel in output.channels_mut() {
                channel[frame] = value;
            }
        }
        Ok(())
    }
}

/// Passthru with a fixed tail that emits `level` wherever the input is silent.
pub struct Ringing {
    pub tail: u64,
    pub level: f32,
}

impl Processor for Ringing {
    fn name(&self) -> &str {
        "ringing"
    }

    fn process(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) -> bounce::Result<()> {
        output.copy_and_map_channels(input)?;
        for channel in output.channels_mut() {
            for sample in channel.iter_mut().filter(|s| **s == 0.0) {
                *sample = self.level;
            }
        }
        Ok(())
    }

    fn tail_frames(&self) -> u64 {
        self.tail
    }
}

/// Emits its own running frame index on every channel, ignoring the input.
pub struct FrameCounter {
    pub tail: u64,
    next: u64,
}

impl FrameCounter {
    pub fn with_tail(tail: u64) -> Self {
        Self { tail, next: 0 }
    }
}

impl Processor for FrameCounter {
    fn name(&self) -> &str {
        "frame-counter"
    }

    fn process(&mut self, _input: &SampleBuffer, output: &mut SampleBuffer) -> bounce::Result<()> {
        for frame in 0..output.blocksize() {
            let value = (self.next + frame as u64) as f32;
            for channel in output.channels_mut() {
                channel[frame] = value;
            }
        }
        self.next += output.blocksize() as u64;
        Ok(())
    }

    fn tail_frames(&self) -> u64 {
        self.tail
    }
}
