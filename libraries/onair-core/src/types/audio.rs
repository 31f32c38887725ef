/// Audio-related types
use crate::error::{OnairError, Result};
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// CD quality (44.1 kHz)
    pub const CD_QUALITY: Self = Self(44_100);
    /// DVD / broadcast quality (48 kHz)
    pub const DVD_QUALITY: Self = Self(48_000);
    /// High resolution (96 kHz)
    pub const HIGH_RES_96: Self = Self(96_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }

    /// Nyquist frequency in Hz
    pub fn nyquist(&self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

/// Audio format information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of channels (1 = mono, 2 = stereo, etc.)
    pub channels: u16,

    /// Bit depth of the source encoding (informational; samples are always f32)
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Create a new audio format
    pub fn new(sample_rate: SampleRate, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Create CD quality stereo format (44.1kHz, 16-bit, stereo)
    pub fn cd_quality() -> Self {
        Self {
            sample_rate: SampleRate::CD_QUALITY,
            channels: 2,
            bits_per_sample: 16,
        }
    }
}

/// Audio buffer containing decoded samples
///
/// Samples are stored as f32 with a nominal range of [-1.0, 1.0]. Stages in
/// the mastering chain may transiently exceed that range before limiting.
///
/// Layout is interleaved (frame-major): `[L, R, L, R, ...]` for stereo. Every
/// stage reads and writes this layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Audio samples (f32, interleaved)
    pub samples: Vec<f32>,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioBuffer {
    /// Create a new audio buffer without validating the shape
    pub fn new(samples: Vec<f32>, format: AudioFormat) -> Self {
        Self { samples, format }
    }

    /// Create a new audio buffer, validating channel count, sample rate and shape
    ///
    /// # Errors
    /// Returns `UnsupportedChannelLayout` for zero channels or a sample count
    /// that is not a whole number of frames, and `InvalidBuffer` for a zero
    /// sample rate.
    pub fn try_new(samples: Vec<f32>, format: AudioFormat) -> Result<Self> {
        let buffer = Self::new(samples, format);
        buffer.validate()?;
        Ok(buffer)
    }

    /// Check the structural invariants of this buffer
    ///
    /// # Errors
    /// See [`AudioBuffer::try_new`].
    pub fn validate(&self) -> Result<()> {
        if self.format.channels == 0 {
            return Err(OnairError::UnsupportedChannelLayout(
                "buffer has zero channels".to_string(),
            ));
        }
        if self.format.sample_rate.as_hz() == 0 {
            return Err(OnairError::invalid_buffer("sample rate must be positive"));
        }
        if self.samples.len() % self.format.channels as usize != 0 {
            return Err(OnairError::UnsupportedChannelLayout(format!(
                "{} samples is not a whole number of {}-channel frames",
                self.samples.len(),
                self.format.channels
            )));
        }
        Ok(())
    }

    /// Build a buffer with the same format and new samples
    pub fn with_samples(&self, samples: Vec<f32>) -> Self {
        Self {
            samples,
            format: self.format,
        }
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        self.format.channels as usize
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate.as_hz()
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        match self.format.channels {
            0 => 0,
            channels => self.samples.len() / channels as usize,
        }
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        match self.sample_rate() {
            0 => 0.0,
            rate => self.frames() as f64 / f64::from(rate),
        }
    }

    /// Iterate over the samples of one channel
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        let stride = self.channels().max(1);
        self.samples.iter().skip(channel).step_by(stride).copied()
    }

    /// Largest absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }
}
