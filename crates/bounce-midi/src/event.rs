//! Timed events with absolute frame timestamps.

use serde::{Deserialize, Serialize};

/// Meta event type bytes (the byte after `0xFF` in a MIDI file).
pub mod meta {
    pub const TEXT: u8 = 0x01;
    pub const COPYRIGHT: u8 = 0x02;
    pub const TRACK_NAME: u8 = 0x03;
    pub const INSTRUMENT_NAME: u8 = 0x04;
    pub const LYRIC: u8 = 0x05;
    pub const MARKER: u8 = 0x06;
    pub const CUE_POINT: u8 = 0x07;
    pub const PROGRAM_NAME: u8 = 0x08;
    pub const DEVICE_NAME: u8 = 0x09;
    pub const END_OF_TRACK: u8 = 0x2f;
    pub const TEMPO: u8 = 0x51;
    pub const TIME_SIGNATURE: u8 = 0x58;
    pub const KEY_SIGNATURE: u8 = 0x59;
    pub const SEQUENCER_SPECIFIC: u8 = 0x7f;
}

/// Status byte that opens a system exclusive message.
pub const SYSEX_STATUS: u8 = 0xf0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Channel voice message: status plus up to two data bytes.
    Voice,
    /// System exclusive, payload in `extra_data`.
    System,
    /// File meta event; `status` holds the meta type.
    Meta,
}

/// One event positioned at an absolute frame.
///
/// `delta_frames` is only meaningful on events handed out by
/// [`EventSequence::extract_window`](crate::EventSequence::extract_window),
/// where it is the offset into the delivered block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub kind: EventKind,
    pub timestamp: u64,
    pub delta_frames: usize,
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
    pub extra_data: Vec<u8>,
}

impl TimedEvent {
    #[inline]
    pub fn voice(timestamp: u64, status: u8, data1: u8, data2: u8) -> Self {
        Self {
            kind: EventKind::Voice,
            timestamp,
            delta_frames: 0,
            status,
            data1,
            data2,
            extra_data: Vec::new(),
        }
    }

    pub fn meta(timestamp: u64, meta_type: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: EventKind::Meta,
            timestamp,
            delta_frames: 0,
            status: meta_type,
            data1: 0,
            data2: 0,
            extra_data: payload.into(),
        }
    }

    pub fn sysex(timestamp: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: EventKind::System,
            timestamp,
            delta_frames: 0,
            status: SYSEX_STATUS,
            data1: 0,
            data2: 0,
            extra_data: payload.into(),
        }
    }

    #[inline]
    pub fn note_on(timestamp: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::voice(timestamp, 0x90 | (channel & 0x0f), note, velocity)
    }

    #[inline]
    pub fn note_off(timestamp: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::voice(timestamp, 0x80 | (channel & 0x0f), note, velocity)
    }

    /// MIDI channel (0-15) of a voice event.
    pub fn channel(&self) -> Option<u8> {
        match self.kind {
            EventKind::Voice => Some(self.status & 0x0f),
            _ => None,
        }
    }

    /// Note on with non-zero velocity.
    pub fn is_note_on(&self) -> bool {
        self.kind == EventKind::Voice && self.status & 0xf0 == 0x90 && self.data2 > 0
    }

    /// Note off, or note on with zero velocity.
    pub fn is_note_off(&self) -> bool {
        self.kind == EventKind::Voice
            && (self.status & 0xf0 == 0x80 || (self.status & 0xf0 == 0x90 && self.data2 == 0))
    }

    /// Variable-length data for system and meta events. Empty for voice
    /// events.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.extra_data
    }
}
