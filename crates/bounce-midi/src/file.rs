//! Standard MIDI File reading.
//!
//! Parses SMF data with `midly` and converts one track into an
//! [`EventSequence`] with absolute frame timestamps, ready for block-by-block
//! extraction.

use crate::error::{Error, Result};
use crate::event::{meta, TimedEvent};
use crate::sequence::EventSequence;
use bounce_core::AudioSettings;
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load a MIDI file from disk and read `track` from it.
pub fn load_sequence(
    path: impl AsRef<Path>,
    track: usize,
    settings: &AudioSettings,
) -> Result<EventSequence> {
    let path = path.as_ref();
    info!("Reading MIDI file {}", path.display());
    let data = std::fs::read(path)?;
    read_sequence(&data, track, settings)
}

/// Read `track` from SMF bytes.
///
/// Format 0 files must hold exactly one track and only track 0 may be
/// requested. Format 1 files may request any track. Format 2 and SMPTE
/// timecode division are rejected.
///
/// Tick positions are converted to frames using the sample rate and tempo in
/// `settings`.
pub fn read_sequence(data: &[u8], track: usize, settings: &AudioSettings) -> Result<EventSequence> {
    let smf = Smf::parse(data)?;

    let division = match smf.header.timing {
        Timing::Metrical(tpb) => tpb.as_int(),
        Timing::Timecode(_, _) => return Err(Error::MidiUnsupportedTiming),
    };

    debug!(
        "MIDI file: {:?}, {} tracks, {} ticks per beat",
        smf.header.format,
        smf.tracks.len(),
        division
    );

    match smf.header.format {
        Format::SingleTrack => {
            if smf.tracks.len() != 1 {
                return Err(Error::UnsupportedFormat(
                    "type 0 file must contain exactly one track",
                ));
            }
        }
        Format::Parallel => {}
        Format::Sequential => {
            return Err(Error::UnsupportedFormat("type 2 files are not supported"));
        }
    }

    let events = smf.tracks.get(track).ok_or(Error::TrackOutOfRange {
        requested: track,
        available: smf.tracks.len(),
    })?;

    let frames_per_tick = settings.frames_per_tick(division);
    let mut sequence = EventSequence::with_capacity(events.len());
    let mut ticks = 0u64;

    for event in events.iter() {
        ticks += u64::from(event.delta.as_int());
        // From the absolute tick so per-event truncation can't accumulate.
        let frame = (ticks as f64 * frames_per_tick).floor() as u64;
        sequence.append(convert_event(&event.kind, frame));
    }

    debug!(
        "Read {} events from track {} ending at frame {}",
        sequence.len(),
        track,
        sequence.end_timestamp().unwrap_or(0)
    );

    Ok(sequence)
}

fn convert_event(kind: &TrackEventKind, frame: u64) -> Option<TimedEvent> {
    match kind {
        TrackEventKind::Midi { channel, message } => {
            let channel = channel.as_int();
            let (status, data1, data2) = match *message {
                MidiMessage::NoteOff { key, vel } => (0x80, key.as_int(), vel.as_int()),
                MidiMessage::NoteOn { key, vel } => (0x90, key.as_int(), vel.as_int()),
                MidiMessage::Aftertouch { key, vel } => (0xa0, key.as_int(), vel.as_int()),
                MidiMessage::Controller { controller, value } => {
                    (0xb0, controller.as_int(), value.as_int())
                }
                MidiMessage::ProgramChange { program } => (0xc0, program.as_int(), 0),
                MidiMessage::ChannelAftertouch { vel } => (0xd0, vel.as_int(), 0),
                MidiMessage::PitchBend { bend } => {
                    let raw = bend.0.as_int();
                    (0xe0, (raw & 0x7f) as u8, (raw >> 7) as u8)
                }
            };
            Some(TimedEvent::voice(frame, status | channel, data1, data2))
        }
        TrackEventKind::SysEx(data) => Some(TimedEvent::sysex(frame, *data)),
        TrackEventKind::Escape(_) => {
            debug!("Dropping escape sequence at frame {}", frame);
            None
        }
        TrackEventKind::Meta(message) => convert_meta(message, frame),
    }
}

fn convert_meta(message: &MetaMessage, frame: u64) -> Option<TimedEvent> {
    match *message {
        MetaMessage::Tempo(micros) => {
            let micros = micros.as_int();
            let bytes = [(micros >> 16) as u8, (micros >> 8) as u8, micros as u8];
            Some(TimedEvent::meta(frame, meta::TEMPO, bytes))
        }
        MetaMessage::TimeSignature(numerator, denominator, clocks, notated) => Some(
            TimedEvent::meta(frame, meta::TIME_SIGNATURE, [numerator, denominator, clocks, notated]),
        ),
        MetaMessage::EndOfTrack => Some(TimedEvent::meta(frame, meta::END_OF_TRACK, Vec::new())),
        MetaMessage::Text(_)
        | MetaMessage::Copyright(_)
        | MetaMessage::TrackName(_)
        | MetaMessage::InstrumentName(_)
        | MetaMessage::Lyric(_)
        | MetaMessage::Marker(_)
        | MetaMessage::CuePoint(_)
        | MetaMessage::ProgramName(_)
        | MetaMessage::DeviceName(_) => {
            debug!("Ignoring text meta event at frame {}", frame);
            None
        }
        MetaMessage::KeySignature(_, _) | MetaMessage::SequencerSpecific(_) => {
            debug!("Ignoring meta event {:?} at frame {}", message, frame);
            None
        }
        ref other => {
            warn!("Ignoring unsupported meta event {:?} at frame {}", other, frame);
            None
        }
    }
}
