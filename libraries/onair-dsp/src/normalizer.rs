//! Sample normalization
//!
//! Converts integer or floating-point PCM into the canonical `f32`
//! representation used by every other stage.
//!
//! - Signed integers are divided by the encoding's largest positive value
//!   (`i16 / 32767`), so the most negative code lands slightly below -1.0.
//! - Unsigned (offset-binary) integers are re-centred at their midpoint first.
//! - Floats are cast and otherwise left untouched.
//!
//! Input and output are interleaved (frame-major).

use crate::error::{DspError, Result};
use onair_core::{AudioBuffer, AudioFormat, SampleRate};

/// A PCM sample type that can be mapped onto the canonical float range
pub trait PcmSample: Copy {
    /// Bit depth of the encoding
    const BITS: u16;

    /// Convert to canonical f32
    fn to_f32(self) -> f32;
}

/// Signed 24-bit sample carried in the low bits of an `i32`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int24(pub i32);

const I8_MAX: f32 = i8::MAX as f32;
const I16_MAX: f32 = i16::MAX as f32;
const I24_MAX: f64 = 8_388_607.0;
const I32_MAX: f64 = i32::MAX as f64;

impl PcmSample for i8 {
    const BITS: u16 = 8;
    fn to_f32(self) -> f32 {
        f32::from(self) / I8_MAX
    }
}

impl PcmSample for i16 {
    const BITS: u16 = 16;
    fn to_f32(self) -> f32 {
        f32::from(self) / I16_MAX
    }
}

impl PcmSample for Int24 {
    const BITS: u16 = 24;
    fn to_f32(self) -> f32 {
        (f64::from(self.0) / I24_MAX) as f32
    }
}

impl PcmSample for i32 {
    const BITS: u16 = 32;
    fn to_f32(self) -> f32 {
        (f64::from(self) / I32_MAX) as f32
    }
}

impl PcmSample for u8 {
    const BITS: u16 = 8;
    fn to_f32(self) -> f32 {
        (f32::from(self) - 128.0) / I8_MAX
    }
}

impl PcmSample for u16 {
    const BITS: u16 = 16;
    fn to_f32(self) -> f32 {
        (f32::from(self) - 32_768.0) / I16_MAX
    }
}

impl PcmSample for u32 {
    const BITS: u16 = 32;
    fn to_f32(self) -> f32 {
        ((f64::from(self) - 2_147_483_648.0) / I32_MAX) as f32
    }
}

impl PcmSample for f32 {
    const BITS: u16 = 32;
    fn to_f32(self) -> f32 {
        self
    }
}

impl PcmSample for f64 {
    const BITS: u16 = 64;
    fn to_f32(self) -> f32 {
        self as f32
    }
}

/// Numeric family of a packed sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Two's complement integer
    Signed,
    /// Offset-binary integer
    Unsigned,
    /// IEEE 754 float
    Float,
}

/// Recognized little-endian packed sample encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Unsigned 8-bit (WAV's 8-bit encoding)
    U8,
    /// Signed 8-bit
    S8,
    /// Signed 16-bit
    S16,
    /// Signed 24-bit, packed in 3 bytes
    S24,
    /// Signed 32-bit
    S32,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl SampleFormat {
    /// Resolve a kind/bit-depth pair
    ///
    /// # Errors
    /// `UnsupportedFormat` when the pair is not a recognized encoding
    pub fn from_descriptor(kind: SampleKind, bits: u16) -> Result<Self> {
        match (kind, bits) {
            (SampleKind::Unsigned, 8) => Ok(Self::U8),
            (SampleKind::Signed, 8) => Ok(Self::S8),
            (SampleKind::Signed, 16) => Ok(Self::S16),
            (SampleKind::Signed, 24) => Ok(Self::S24),
            (SampleKind::Signed, 32) => Ok(Self::S32),
            (SampleKind::Float, 32) => Ok(Self::F32),
            (SampleKind::Float, 64) => Ok(Self::F64),
            (kind, bits) => Err(DspError::UnsupportedFormat(format!(
                "{:?} {}-bit samples",
                kind, bits
            ))),
        }
    }

    /// Packed size of one sample in bytes
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::U8 | Self::S8 => 1,
            Self::S16 => 2,
            Self::S24 => 3,
            Self::S32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Bit depth of the encoding
    pub fn bits(&self) -> u16 {
        (self.bytes_per_sample() * 8) as u16
    }

    fn decode(&self, bytes: &[u8]) -> f32 {
        match self {
            Self::U8 => bytes[0].to_f32(),
            Self::S8 => i8::from_le_bytes([bytes[0]]).to_f32(),
            Self::S16 => i16::from_le_bytes([bytes[0], bytes[1]]).to_f32(),
            // Shift into the top of an i32 and back down to sign-extend
            Self::S24 => Int24(i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8).to_f32(),
            Self::S32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]).to_f32(),
            Self::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            Self::F64 => f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])
            .to_f32(),
        }
    }
}

/// Normalize typed interleaved samples into an `AudioBuffer`
///
/// # Errors
/// `UnsupportedChannelLayout` for zero channels or a ragged final frame,
/// `InvalidBuffer` for a zero sample rate.
pub fn normalize<S: PcmSample>(
    samples: &[S],
    channels: u16,
    sample_rate: u32,
) -> Result<AudioBuffer> {
    check_layout(samples.len(), channels)?;

    let converted = samples.iter().map(|s| s.to_f32()).collect();
    build(converted, channels, sample_rate, S::BITS)
}

/// Normalize little-endian packed PCM bytes into an `AudioBuffer`
///
/// # Errors
/// As [`normalize`], plus `UnsupportedChannelLayout` when the byte count is
/// not a whole number of samples.
pub fn normalize_bytes(
    bytes: &[u8],
    format: SampleFormat,
    channels: u16,
    sample_rate: u32,
) -> Result<AudioBuffer> {
    let width = format.bytes_per_sample();
    if bytes.len() % width != 0 {
        return Err(DspError::UnsupportedChannelLayout(format!(
            "{} bytes is not a whole number of {}-byte samples",
            bytes.len(),
            width
        )));
    }
    check_layout(bytes.len() / width, channels)?;

    let converted = bytes.chunks_exact(width).map(|b| format.decode(b)).collect();
    build(converted, channels, sample_rate, format.bits())
}

fn check_layout(sample_count: usize, channels: u16) -> Result<()> {
    if channels == 0 {
        return Err(DspError::UnsupportedChannelLayout(
            "channel count must be at least 1".to_string(),
        ));
    }
    if sample_count % channels as usize != 0 {
        return Err(DspError::UnsupportedChannelLayout(format!(
            "{} samples cannot be split into {} channels",
            sample_count, channels
        )));
    }
    Ok(())
}

fn build(samples: Vec<f32>, channels: u16, sample_rate: u32, bits: u16) -> Result<AudioBuffer> {
    let format = AudioFormat::new(SampleRate::new(sample_rate), channels, bits);
    Ok(AudioBuffer::try_new(samples, format)?)
}
