//! The processing seam between the host loop and whatever renders audio.
//!
//! A [`Processor`] receives each block's events with block-relative offsets,
//! then turns one input block into one output block. Built-in processors cover
//! the simple cases; plugin wrappers implement the same trait.

use crate::Result;
use bounce_core::{AudioSettings, Sample, SampleBuffer};
use bounce_midi::TimedEvent;
use tracing::debug;

/// Block processor driven by [`OfflineHost`](crate::OfflineHost).
pub trait Processor: Send {
    fn name(&self) -> &str;

    /// Called once before the first block.
    fn prepare(&mut self, _settings: &AudioSettings) -> Result<()> {
        Ok(())
    }

    /// Events due in the next block, in timestamp order. Called before every
    /// [`process`](Self::process), with an empty slice when nothing is due.
    fn process_events(&mut self, _events: &[TimedEvent]) {}

    /// Render `output` from `input`. Both buffers share the run's blocksize.
    fn process(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) -> Result<()>;

    /// Frames the processor keeps sounding after its input ends.
    fn tail_frames(&self) -> u64 {
        0
    }
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn prepare(&mut self, settings: &AudioSettings) -> Result<()> {
        (**self).prepare(settings)
    }

    fn process_events(&mut self, events: &[TimedEvent]) {
        (**self).process_events(events)
    }

    fn process(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) -> Result<()> {
        (**self).process(input, output)
    }

    fn tail_frames(&self) -> u64 {
        (**self).tail_frames()
    }
}

/// Copies input to output, mapping channel counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthru;

impl Processor for Passthru {
    fn name(&self) -> &str {
        "passthru"
    }

    fn process(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) -> Result<()> {
        output.copy_and_map_channels(input)?;
        Ok(())
    }
}

/// Linear gain.
#[derive(Debug, Clone, Copy)]
pub struct Gain {
    gain: Sample,
}

impl Default for Gain {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}

impl Gain {
    pub fn new(gain: Sample) -> Self {
        Self { gain }
    }

    pub fn from_db(db: Sample) -> Self {
        Self::new(10f32.powf(db / 20.0))
    }

    pub fn gain(&self) -> Sample {
        self.gain
    }

    pub fn set_gain(&mut self, gain: Sample) {
        debug!("Setting gain to {}", gain);
        self.gain = gain;
    }
}

impl Processor for Gain {
    fn name(&self) -> &str {
        "gain"
    }

    fn process(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) -> Result<()> {
        output.copy_and_map_channels(input)?;
        for channel in output.channels_mut() {
            for sample in channel.iter_mut() {
                *sample *= self.gain;
            }
        }
        Ok(())
    }
}

/// Always outputs silence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl Processor for Silence {
    fn name(&self) -> &str {
        "silence"
    }

    fn process(&mut self, _input: &SampleBuffer, output: &mut SampleBuffer) -> Result<()> {
        output.clear();
        Ok(())
    }
}

/// Hard clips to [-1.0, 1.0].
#[derive(Debug, Clone, Copy, Default)]
pub struct Limiter;

impl Processor for Limiter {
    fn name(&self) -> &str {
        "limiter"
    }

    fn process(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) -> Result<()> {
        output.copy_and_map_channels(input)?;
        for channel in output.channels_mut() {
            for sample in channel.iter_mut() {
                *sample = sample.clamp(-1.0, 1.0);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn stereo(left: Sample, right: Sample) -> SampleBuffer {
        let mut buffer = SampleBuffer::new(2, 4).unwrap();
        buffer.channel_mut(0).fill(left);
        buffer.channel_mut(1).fill(right);
        buffer
    }

    #[test]
    fn test_passthru() {
        let input = stereo(0.25, -0.5);
        let mut output = SampleBuffer::new(2, 4).unwrap();
        Passthru.process(&input, &mut output).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_passthru_maps_mono_to_stereo() {
        let mut input = SampleBuffer::new(1, 4).unwrap();
        input.channel_mut(0).fill(0.3);
        let mut output = SampleBuffer::new(2, 4).unwrap();
        Passthru.process(&input, &mut output).unwrap();
        assert!(output.channels().all(|c| c.iter().all(|s| *s == 0.3)));
    }

    #[test]
    fn test_gain() {
        let input = stereo(0.5, -0.5);
        let mut output = SampleBuffer::new(2, 4).unwrap();
        Gain::new(0.5).process(&input, &mut output).unwrap();
        assert!(output.channel(0).iter().all(|s| *s == 0.25));
        assert!(output.channel(1).iter().all(|s| *s == -0.25));
    }

    #[test]
    fn test_gain_may_exceed_full_scale() {
        let input = stereo(0.8, 0.8);
        let mut output = SampleBuffer::new(2, 4).unwrap();
        Gain::new(2.0).process(&input, &mut output).unwrap();
        assert_abs_diff_eq!(output.peak(), 1.6, epsilon = 1e-6);
    }

    #[test]
    fn test_gain_from_db() {
        assert_abs_diff_eq!(Gain::from_db(0.0).gain(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(Gain::from_db(-6.0).gain(), 0.501_187, epsilon = 1e-5);
    }

    #[test]
    fn test_silence() {
        let input = stereo(0.5, 0.5);
        let mut output = stereo(0.9, 0.9);
        Silence.process(&input, &mut output).unwrap();
        assert_eq!(output.peak(), 0.0);
    }

    #[test]
    fn test_limiter() {
        let input = stereo(1.5, -3.0);
        let mut output = SampleBuffer::new(2, 4).unwrap();
        Limiter.process(&input, &mut output).unwrap();
        assert!(output.channel(0).iter().all(|s| *s == 1.0));
        assert!(output.channel(1).iter().all(|s| *s == -1.0));
    }

    #[test]
    fn test_mismatched_blocksize_is_error() {
        let input = SampleBuffer::new(2, 8).unwrap();
        let mut output = SampleBuffer::new(2, 4).unwrap();
        assert!(Gain::default().process(&input, &mut output).is_err());
    }

    #[test]
    fn test_boxed_processor() {
        let mut boxed: Box<dyn Processor> = Box::new(Gain::new(0.0));
        assert_eq!(boxed.name(), "gain");
        assert_eq!(boxed.tail_frames(), 0);
        let input = stereo(1.0, 1.0);
        let mut output = SampleBuffer::new(2, 4).unwrap();
        boxed.process(&input, &mut output).unwrap();
        assert_eq!(output.peak(), 0.0);
    }
}
