//! Conversion between normalized samples and fixed-width PCM bytes.
//!
//! PCM data is interleaved frame by frame: every channel of frame 0, then every
//! channel of frame 1, and so on.
//!
//! | Depth | Stored as | Encode | Decode |
//! |-------|-----------|--------|--------|
//! | 8     | unsigned byte | `(s + 1) * 127` | `(b - 127) / 127` |
//! | 16    | signed 16-bit | `s * 32767` | `v / 32767` |
//! | 24    | signed, packed in 3 bytes | `s * 8388607` | `v / 8388607` |
//! | 32    | IEEE-754 float | copied | copied |
//!
//! Integer encoding truncates toward zero and saturates at the symmetric rails
//! `±(2^(bits-1) - 1)`, so the most negative two's-complement value is never
//! produced.

use crate::buffer::{Sample, SampleBuffer};
use crate::endian::{flip_u16, is_little_endian_host};
use crate::settings::AudioSettings;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};

/// Supported PCM sample widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum BitDepth {
    Int8,
    #[default]
    Int16,
    Int24,
    /// 32-bit files carry IEEE floats, not integers.
    Float32,
}

impl BitDepth {
    /// Bits per sample.
    pub const fn bits(self) -> u16 {
        match self {
            BitDepth::Int8 => 8,
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        }
    }

    pub const fn bytes_per_sample(self) -> usize {
        self.bits() as usize / 8
    }

    /// Positive full scale, `2^(bits-1) - 1`.
    ///
    /// Kept as `f64` since the 32-bit value does not fit an `f32` mantissa.
    pub fn scale_max(self) -> f64 {
        2f64.powi(i32::from(self.bits()) - 1) - 1.0
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = Error;

    fn try_from(bits: u16) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::Int8),
            16 => Ok(BitDepth::Int16),
            24 => Ok(BitDepth::Int24),
            32 => Ok(BitDepth::Float32),
            other => Err(Error::UnsupportedBitDepth(other)),
        }
    }
}

impl From<BitDepth> for u16 {
    fn from(depth: BitDepth) -> Self {
        depth.bits()
    }
}

/// Byte order of stored PCM data, independent of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    pub const fn host() -> Self {
        if is_little_endian_host() {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }

    pub const fn is_little_endian(self) -> bool {
        matches!(self, ByteOrder::LittleEndian)
    }

    /// True when values in this order can be read with native loads.
    pub const fn matches_host(self) -> bool {
        self.is_little_endian() == is_little_endian_host()
    }
}

/// Per-depth sample encoding.
///
/// One implementation exists per [`BitDepth`]; [`PcmCodec`] picks it once at
/// construction and owns the interleaving loop, so whole blocks only move
/// through its dimension-checked [`encode`](PcmCodec::encode) and
/// [`decode`](PcmCodec::decode).
pub trait PcmFormat: Send + Sync {
    fn bit_depth(&self) -> BitDepth;

    /// Write one sample into `out`, which is exactly one sample wide.
    fn write_sample(&self, sample: Sample, order: ByteOrder, out: &mut [u8]);

    /// Read one sample from `bytes`, which is exactly one sample wide.
    fn read_sample(&self, bytes: &[u8], order: ByteOrder) -> Sample;

    /// Byte value that, repeated, encodes silence.
    fn silence_byte(&self) -> u8 {
        0
    }
}

/// Unsigned 8-bit, biased so that 0.0 sits at 127.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pcm8;

impl PcmFormat for Pcm8 {
    fn bit_depth(&self) -> BitDepth {
        BitDepth::Int8
    }

    fn write_sample(&self, sample: Sample, _order: ByteOrder, out: &mut [u8]) {
        let scale = BitDepth::Int8.scale_max();
        out[0] = ((f64::from(sample) + 1.0) * scale) as u8;
    }

    fn read_sample(&self, bytes: &[u8], _order: ByteOrder) -> Sample {
        ((f64::from(bytes[0]) - 127.0) / BitDepth::Int8.scale_max()) as Sample
    }

    fn silence_byte(&self) -> u8 {
        127
    }
}

/// Signed 16-bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pcm16;

impl PcmFormat for Pcm16 {
    fn bit_depth(&self) -> BitDepth {
        BitDepth::Int16
    }

    fn write_sample(&self, sample: Sample, order: ByteOrder, out: &mut [u8]) {
        let value = (f64::from(sample) * BitDepth::Int16.scale_max()) as i16;
        let value = value.max(-i16::MAX) as u16;
        let stored = if order.matches_host() {
            value
        } else {
            flip_u16(value)
        };
        out.copy_from_slice(&stored.to_ne_bytes());
    }

    fn read_sample(&self, bytes: &[u8], order: ByteOrder) -> Sample {
        let stored = u16::from_ne_bytes([bytes[0], bytes[1]]);
        let value = if order.matches_host() {
            stored
        } else {
            flip_u16(stored)
        };
        (f64::from(value as i16) / BitDepth::Int16.scale_max()) as Sample
    }
}

/// Signed 24-bit, packed into exactly three bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pcm24;

impl PcmFormat for Pcm24 {
    fn bit_depth(&self) -> BitDepth {
        BitDepth::Int24
    }

    fn write_sample(&self, sample: Sample, order: ByteOrder, out: &mut [u8]) {
        let scale = BitDepth::Int24.scale_max();
        let value = (f64::from(sample) * scale).clamp(-scale, scale) as i32;

        let low = (value & 0xff) as u8;
        let mid = ((value >> 8) & 0xff) as u8;
        let high = ((value >> 16) & 0xff) as u8;

        match order {
            ByteOrder::LittleEndian => out.copy_from_slice(&[low, mid, high]),
            ByteOrder::BigEndian => out.copy_from_slice(&[high, mid, low]),
        }
    }

    fn read_sample(&self, bytes: &[u8], order: ByteOrder) -> Sample {
        let (low, mid, high) = match order {
            ByteOrder::LittleEndian => (bytes[0], bytes[1], bytes[2]),
            ByteOrder::BigEndian => (bytes[2], bytes[1], bytes[0]),
        };

        let mut value = (u32::from(high) << 16) | (u32::from(mid) << 8) | u32::from(low);
        // Negative: extend the sign through the missing top byte.
        if high & 0x80 != 0 {
            value |= 0xff00_0000;
        }

        (f64::from(value as i32) / BitDepth::Int24.scale_max()) as Sample
    }
}

/// Raw IEEE-754 single precision, unscaled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Float32;

impl PcmFormat for Float32 {
    fn bit_depth(&self) -> BitDepth {
        BitDepth::Float32
    }

    fn write_sample(&self, sample: Sample, order: ByteOrder, out: &mut [u8]) {
        // Byte-level so NaN payloads keep their exact bits.
        let bytes = match order {
            ByteOrder::LittleEndian => sample.to_le_bytes(),
            ByteOrder::BigEndian => sample.to_be_bytes(),
        };
        out.copy_from_slice(&bytes);
    }

    fn read_sample(&self, bytes: &[u8], order: ByteOrder) -> Sample {
        let bytes = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match order {
            ByteOrder::LittleEndian => f32::from_le_bytes(bytes),
            ByteOrder::BigEndian => f32::from_be_bytes(bytes),
        }
    }
}

fn format_for(bit_depth: BitDepth) -> Box<dyn PcmFormat> {
    match bit_depth {
        BitDepth::Int8 => Box::new(Pcm8),
        BitDepth::Int16 => Box::new(Pcm16),
        BitDepth::Int24 => Box::new(Pcm24),
        BitDepth::Float32 => Box::new(Float32),
    }
}

/// Caller guarantees `out` holds exactly one block for `buffer`.
fn encode_block(
    format: &dyn PcmFormat,
    buffer: &SampleBuffer,
    order: ByteOrder,
    out: &mut [u8],
) {
    let width = format.bit_depth().bytes_per_sample();
    let frame_width = width * buffer.num_channels();

    for (frame, frame_bytes) in out.chunks_exact_mut(frame_width).enumerate() {
        for (channel, slot) in frame_bytes.chunks_exact_mut(width).enumerate() {
            format.write_sample(buffer.channel(channel)[frame], order, slot);
        }
    }
}

/// Caller guarantees `bytes` holds exactly one block for `buffer`.
fn decode_block(
    format: &dyn PcmFormat,
    bytes: &[u8],
    order: ByteOrder,
    buffer: &mut SampleBuffer,
) {
    let width = format.bit_depth().bytes_per_sample();
    let frame_width = width * buffer.num_channels();

    for (frame, frame_bytes) in bytes.chunks_exact(frame_width).enumerate() {
        for (channel, slot) in frame_bytes.chunks_exact(width).enumerate() {
            buffer.channel_mut(channel)[frame] = format.read_sample(slot, order);
        }
    }
}

/// Encoder/decoder for one fixed PCM layout.
pub struct PcmCodec {
    format: Box<dyn PcmFormat>,
    byte_order: ByteOrder,
    channels: usize,
    blocksize: usize,
}

impl std::fmt::Debug for PcmCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcmCodec")
            .field("bit_depth", &self.bit_depth())
            .field("byte_order", &self.byte_order)
            .field("channels", &self.channels)
            .field("blocksize", &self.blocksize)
            .finish()
    }
}

impl PcmCodec {
    pub fn new(
        channels: usize,
        blocksize: usize,
        bit_depth: BitDepth,
        byte_order: ByteOrder,
    ) -> Result<Self> {
        if channels == 0 || blocksize == 0 {
            return Err(Error::EmptyBuffer {
                channels,
                blocksize,
            });
        }

        Ok(Self {
            format: format_for(bit_depth),
            byte_order,
            channels,
            blocksize,
        })
    }

    /// Same as [`PcmCodec::new`] with the depth given in bits.
    pub fn with_bits(
        channels: usize,
        blocksize: usize,
        bits: u16,
        byte_order: ByteOrder,
    ) -> Result<Self> {
        Self::new(channels, blocksize, BitDepth::try_from(bits)?, byte_order)
    }

    pub fn from_settings(settings: &AudioSettings) -> Result<Self> {
        Self::new(
            settings.channels(),
            settings.blocksize(),
            settings.bit_depth(),
            settings.byte_order(),
        )
    }

    #[inline]
    pub fn bit_depth(&self) -> BitDepth {
        self.format.bit_depth()
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn blocksize(&self) -> usize {
        self.blocksize
    }

    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        self.bit_depth().bytes_per_sample()
    }

    /// Bytes in one interleaved frame.
    #[inline]
    pub fn frame_bytes(&self) -> usize {
        self.channels * self.bytes_per_sample()
    }

    /// Bytes in one full block.
    #[inline]
    pub fn block_bytes(&self) -> usize {
        self.frame_bytes() * self.blocksize
    }

    /// Byte value used to pad short blocks with silence.
    #[inline]
    pub fn silence_byte(&self) -> u8 {
        self.format.silence_byte()
    }

    /// Interleave and encode `buffer` into `out`.
    pub fn encode(&self, buffer: &SampleBuffer, out: &mut [u8]) -> Result<()> {
        self.check_buffer(buffer)?;
        self.check_bytes(out.len())?;
        encode_block(self.format.as_ref(), buffer, self.byte_order, out);
        Ok(())
    }

    /// Decode `bytes` and de-interleave into `buffer`.
    pub fn decode(&self, bytes: &[u8], buffer: &mut SampleBuffer) -> Result<()> {
        self.check_buffer(buffer)?;
        self.check_bytes(bytes.len())?;
        decode_block(self.format.as_ref(), bytes, self.byte_order, buffer);
        Ok(())
    }

    fn check_buffer(&self, buffer: &SampleBuffer) -> Result<()> {
        let expected = (self.channels, self.blocksize);
        if buffer.dimensions() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: buffer.dimensions(),
            });
        }
        Ok(())
    }

    fn check_bytes(&self, actual: usize) -> Result<()> {
        let expected = self.block_bytes();
        if actual != expected {
            return Err(Error::ByteLengthMismatch { expected, actual });
        }
        Ok(())
    }
}

/// One block of raw PCM plus the codec that understands it.
///
/// The bytes are only reachable as a read-only slice or through the
/// encode/decode/IO entry points, so the layout can't be reinterpreted by
/// callers.
#[derive(Debug)]
pub struct PcmBuffer {
    codec: PcmCodec,
    data: Vec<u8>,
}

impl PcmBuffer {
    pub fn new(
        channels: usize,
        blocksize: usize,
        bit_depth: BitDepth,
        byte_order: ByteOrder,
    ) -> Result<Self> {
        Ok(Self::with_codec(PcmCodec::new(
            channels, blocksize, bit_depth, byte_order,
        )?))
    }

    pub fn from_settings(settings: &AudioSettings) -> Result<Self> {
        Ok(Self::with_codec(PcmCodec::from_settings(settings)?))
    }

    pub fn with_codec(codec: PcmCodec) -> Self {
        let data = vec![codec.silence_byte(); codec.block_bytes()];
        Self { codec, data }
    }

    #[inline]
    pub fn codec(&self) -> &PcmCodec {
        &self.codec
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; a codec never has zero-sized blocks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Encode `buffer` into the stored bytes.
    pub fn encode(&mut self, buffer: &SampleBuffer) -> Result<&[u8]> {
        self.codec.encode(buffer, &mut self.data)?;
        Ok(&self.data)
    }

    /// Decode the stored bytes into `buffer`.
    pub fn decode(&self, buffer: &mut SampleBuffer) -> Result<()> {
        self.codec.decode(&self.data, buffer)
    }

    /// Replace the stored bytes with exactly one block of `bytes`.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != self.data.len() {
            return Err(Error::ByteLengthMismatch {
                expected: self.data.len(),
                actual: bytes.len(),
            });
        }
        self.data.copy_from_slice(bytes);
        Ok(())
    }

    /// Fill the block from `reader` and return the number of whole frames read.
    ///
    /// A short read pads the rest of the block with silence; a trailing
    /// partial frame is discarded.
    pub fn read_block<R: Read>(&mut self, reader: &mut R) -> Result<usize> {
        let mut filled = 0;
        while filled < self.data.len() {
            match reader.read(&mut self.data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let frame_bytes = self.codec.frame_bytes();
        let frames = filled / frame_bytes;
        let silence = self.codec.silence_byte();
        self.data[frames * frame_bytes..].fill(silence);

        Ok(frames)
    }

    /// Write the first `frames` frames of the stored block.
    pub fn write_frames<W: Write>(&self, writer: &mut W, frames: usize) -> Result<()> {
        let bytes = frames * self.codec.frame_bytes();
        if bytes > self.data.len() {
            return Err(Error::ByteLengthMismatch {
                expected: self.data.len(),
                actual: bytes,
            });
        }
        writer.write_all(&self.data[..bytes])?;
        Ok(())
    }
}
