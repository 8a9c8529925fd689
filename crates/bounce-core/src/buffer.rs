//! Normalized multi-channel sample storage.

use crate::settings::AudioSettings;
use crate::{Error, Result};
use tracing::debug;

/// A single normalized audio sample. Nominal range is [-1.0, 1.0].
pub type Sample = f32;

/// Fixed-size, non-interleaved block of samples.
///
/// Every channel holds exactly `blocksize` samples for the lifetime of the
/// buffer. Samples can be overwritten in place but channels never grow or
/// shrink.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Box<[Sample]>>,
    blocksize: usize,
}

impl SampleBuffer {
    /// Create a silent buffer.
    ///
    /// Fails with [`Error::EmptyBuffer`] if either dimension is zero.
    pub fn new(num_channels: usize, blocksize: usize) -> Result<Self> {
        if num_channels == 0 || blocksize == 0 {
            return Err(Error::EmptyBuffer {
                channels: num_channels,
                blocksize,
            });
        }

        let channels = (0..num_channels)
            .map(|_| vec![0.0; blocksize].into_boxed_slice())
            .collect();

        Ok(Self {
            channels,
            blocksize,
        })
    }

    /// Create a buffer sized for one processing block of `settings`.
    pub fn from_settings(settings: &AudioSettings) -> Result<Self> {
        Self::new(settings.channels(), settings.blocksize())
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn blocksize(&self) -> usize {
        self.blocksize
    }

    /// (channels, blocksize)
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.channels.len(), self.blocksize)
    }

    /// Samples of one channel.
    ///
    /// # Panics
    /// Panics if `index >= num_channels()`.
    #[inline]
    pub fn channel(&self, index: usize) -> &[Sample] {
        &self.channels[index]
    }

    /// Mutable samples of one channel.
    ///
    /// # Panics
    /// Panics if `index >= num_channels()`.
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [Sample] {
        &mut self.channels[index]
    }

    pub fn channels(&self) -> impl Iterator<Item = &[Sample]> {
        self.channels.iter().map(|c| &c[..])
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [Sample]> {
        self.channels.iter_mut().map(|c| &mut c[..])
    }

    /// Set every sample to zero.
    pub fn clear(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.fill(0.0);
        }
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> Sample {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0, |peak: Sample, s| peak.max(s.abs()))
    }

    /// Copy a whole block from `source`, mapping channel counts.
    ///
    /// Both buffers must share the same blocksize.
    pub fn copy_and_map_channels(&mut self, source: &SampleBuffer) -> Result<()> {
        if self.blocksize != source.blocksize {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: source.dimensions(),
            });
        }
        self.copy_and_map_channels_with_offset(0, source, 0, self.blocksize)
    }

    /// Copy `frames` frames from `source[source_offset..]` into
    /// `self[dest_offset..]`.
    ///
    /// When the source has fewer channels, they are repeated round-robin, so a
    /// stereo source fills a four channel destination as L R L R. Extra
    /// source channels are dropped.
    pub fn copy_and_map_channels_with_offset(
        &mut self,
        dest_offset: usize,
        source: &SampleBuffer,
        source_offset: usize,
        frames: usize,
    ) -> Result<()> {
        if dest_offset + frames > self.blocksize {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: (self.num_channels(), dest_offset + frames),
            });
        }
        if source_offset + frames > source.blocksize {
            return Err(Error::DimensionMismatch {
                expected: source.dimensions(),
                actual: (source.num_channels(), source_offset + frames),
            });
        }

        if source.num_channels() != self.num_channels() {
            debug!(
                "Mapping channels from {} -> {}",
                source.num_channels(),
                self.num_channels()
            );
        }

        let source_channels = source.num_channels();
        for (index, dest) in self.channels.iter_mut().enumerate() {
            let src = &source.channels[index % source_channels];
            dest[dest_offset..dest_offset + frames]
                .copy_from_slice(&src[source_offset..source_offset + frames]);
        }

        Ok(())
    }
}
