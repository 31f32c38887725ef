//! Memoryless tanh soft limiter
//!
//! `y = tanh(x / t) · t`. Odd-symmetric, monotonic and bounded by `t`. Unlike
//! a lookahead limiter it has no attack or release; it only rounds off
//! transients that the gain stage pushed past the threshold.

use crate::config::DEFAULT_LIMITER_THRESHOLD;
use onair_core::AudioBuffer;

/// Soft limiter with a validated threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftLimiter {
    threshold: f32,
    reset_from: Option<f32>,
}

impl SoftLimiter {
    /// Create a limiter
    ///
    /// A threshold outside `(0, 1]` (NaN included) is replaced by 0.95. The
    /// rejected value is kept and reported by [`SoftLimiter::reset_from`].
    pub fn new(threshold: f32) -> Self {
        if threshold > 0.0 && threshold <= 1.0 {
            Self {
                threshold,
                reset_from: None,
            }
        } else {
            tracing::warn!(
                requested = threshold,
                fallback = DEFAULT_LIMITER_THRESHOLD,
                "Limiter threshold outside (0, 1], using fallback"
            );
            Self {
                threshold: DEFAULT_LIMITER_THRESHOLD,
                reset_from: Some(threshold),
            }
        }
    }

    /// Threshold in use
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Requested threshold, if it was rejected
    pub fn reset_from(&self) -> Option<f32> {
        self.reset_from
    }

    /// Limit one sample
    #[inline]
    pub fn limit(&self, sample: f32) -> f32 {
        (sample / self.threshold).tanh() * self.threshold
    }

    /// Limit a buffer, returning a new buffer
    pub fn process(&self, buffer: &AudioBuffer) -> AudioBuffer {
        buffer.with_samples(buffer.samples.iter().map(|&s| self.limit(s)).collect())
    }
}

impl Default for SoftLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMITER_THRESHOLD)
    }
}
