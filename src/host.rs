//! Offline, block-by-block rendering.
//!
//! Each block runs the same pipeline: read PCM, decode, collect the events due
//! in the block, hand them to the processor, process, encode, write. The host
//! is single-threaded and never blocks on anything but its reader and writer.

use crate::processor::Processor;
use crate::Result;
use bounce_core::{AudioClock, AudioSettings, BitDepth, ByteOrder, PcmBuffer, SampleBuffer};
use bounce_midi::{EventSequence, TimedEvent};
use std::io::{Read, Write};
use tracing::{debug, info};

/// Sample encoding of a raw PCM stream. The channel count and blocksize come
/// from the run's [`AudioSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamFormat {
    pub bit_depth: BitDepth,
    pub byte_order: ByteOrder,
}

impl StreamFormat {
    pub fn new(bit_depth: BitDepth, byte_order: ByteOrder) -> Self {
        Self {
            bit_depth,
            byte_order,
        }
    }
}

impl From<&AudioSettings> for StreamFormat {
    fn from(settings: &AudioSettings) -> Self {
        Self::new(settings.bit_depth(), settings.byte_order())
    }
}

/// Totals for one finished render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Frames written to the output.
    pub frames: u64,
    /// Blocks processed, tail blocks included.
    pub blocks: u64,
    pub events_delivered: usize,
}

/// Drives one [`Processor`] over a PCM stream and an optional event sequence.
pub struct OfflineHost {
    settings: AudioSettings,
    processor: Box<dyn Processor>,
    sequence: Option<EventSequence>,
    clock: AudioClock,
}

impl OfflineHost {
    pub fn new(settings: AudioSettings, processor: impl Processor + 'static) -> Self {
        Self {
            settings,
            processor: Box::new(processor),
            sequence: None,
            clock: AudioClock::new(),
        }
    }

    /// Events to deliver alongside the audio.
    pub fn with_sequence(mut self, sequence: EventSequence) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn processor(&self) -> &dyn Processor {
        self.processor.as_ref()
    }

    pub fn sequence(&self) -> Option<&EventSequence> {
        self.sequence.as_ref()
    }

    pub fn clock(&self) -> &AudioClock {
        &self.clock
    }

    /// Render until the input is exhausted and no events remain, then render
    /// the processor's tail on silent input.
    ///
    /// Every block is written in full except the last one, which stops at the
    /// later of the input's final frame and the last event delivered in it.
    /// The tail picks up from there: the rest of that last block is written
    /// first, so the processor's output stays contiguous.
    pub fn render<R: Read, W: Write>(
        &mut self,
        mut input: R,
        input_format: StreamFormat,
        mut output: W,
        output_format: StreamFormat,
    ) -> Result<RenderStats> {
        let channels = self.settings.channels();
        let blocksize = self.settings.blocksize();

        let mut input_pcm = PcmBuffer::new(
            channels,
            blocksize,
            input_format.bit_depth,
            input_format.byte_order,
        )?;
        let mut output_pcm = PcmBuffer::new(
            channels,
            blocksize,
            output_format.bit_depth,
            output_format.byte_order,
        )?;
        let mut input_buffer = SampleBuffer::from_settings(&self.settings)?;
        let mut output_buffer = SampleBuffer::from_settings(&self.settings)?;
        let mut events: Vec<TimedEvent> = Vec::new();
        let mut stats = RenderStats::default();

        self.processor.prepare(&self.settings)?;
        info!(
            "Rendering with '{}': {} channels, blocksize {}, {} bit in, {} bit out",
            self.processor.name(),
            channels,
            blocksize,
            input_format.bit_depth.bits(),
            output_format.bit_depth.bits()
        );

        let mut input_done = false;
        let mut tail: Option<u64> = None;
        let mut events_pending = self
            .sequence
            .as_ref()
            .is_some_and(|sequence| !sequence.is_exhausted());

        loop {
            let frames = if input_done {
                input_pcm.read_block(&mut std::io::empty())?
            } else {
                input_pcm.read_block(&mut input)?
            };
            if frames < blocksize {
                input_done = true;
            }
            if frames == 0 && !events_pending {
                break;
            }

            input_pcm.decode(&mut input_buffer)?;

            events.clear();
            if let Some(sequence) = self.sequence.as_mut() {
                events_pending =
                    sequence.extract_window(self.clock.current_frame(), blocksize, &mut events);
            }
            stats.events_delivered += events.len();

            self.processor.process_events(&events);
            self.processor.process(&input_buffer, &mut output_buffer)?;
            output_pcm.encode(&output_buffer)?;

            let frames_out = if input_done && !events_pending {
                let last_event = events.iter().map(|e| e.delta_frames + 1).max().unwrap_or(0);
                let content = frames.max(last_event);

                let tail_frames = self.processor.tail_frames();
                let carried = tail_frames.min((blocksize - content) as u64);
                tail = Some(tail_frames - carried);
                content + carried as usize
            } else {
                blocksize
            };
            output_pcm.write_frames(&mut output, frames_out)?;

            debug!(
                "Block {} at frame {}: {} frames, {} events",
                stats.blocks,
                self.clock.current_frame(),
                frames_out,
                events.len()
            );

            stats.frames += frames_out as u64;
            stats.blocks += 1;
            self.clock.advance(blocksize);
        }

        let mut tail = tail.unwrap_or_else(|| self.processor.tail_frames());
        if tail > 0 {
            debug!("Rendering {} tail frames", tail);
            input_buffer.clear();
        }
        while tail > 0 {
            let frames_out = tail.min(blocksize as u64) as usize;
            self.processor.process_events(&[]);
            self.processor.process(&input_buffer, &mut output_buffer)?;
            output_pcm.encode(&output_buffer)?;
            output_pcm.write_frames(&mut output, frames_out)?;

            stats.frames += frames_out as u64;
            stats.blocks += 1;
            self.clock.advance(blocksize);
            tail -= frames_out as u64;
        }

        output.flush()?;
        self.clock.stop();

        info!(
            "Rendered {} frames in {} blocks, {} events delivered",
            stats.frames, stats.blocks, stats.events_delivered
        );

        Ok(stats)
    }
}
