//! One-pole RC high-pass filter for rumble removal
//!
//! `y[n] = a * (y[n-1] + x[n] - x[n-1])` with `a = rc / (rc + dt)`,
//! `rc = 1 / (2π·fc)` and `dt = 1 / fs`. State starts at zero and the output
//! has exactly as many samples as the input (no warm-up trimming).

use onair_core::AudioBuffer;
use std::f64::consts::PI;

/// Previous input/output pair for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OnePoleState {
    /// Previous input sample x[n-1]
    pub x_prev: f64,
    /// Previous output sample y[n-1]
    pub y_prev: f64,
}

impl OnePoleState {
    /// Advance the recurrence by one sample
    #[inline]
    pub fn process(&mut self, input: f64, a: f64) -> f64 {
        let output = a * (self.y_prev + input - self.x_prev);
        self.x_prev = input;
        self.y_prev = output;
        output
    }
}

/// First-order high-pass applied independently to every channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighPassFilter {
    cutoff_hz: f64,
}

impl HighPassFilter {
    /// Create a filter with the given cutoff in Hz
    pub fn new(cutoff_hz: f64) -> Self {
        Self { cutoff_hz }
    }

    /// Cutoff frequency in Hz
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    /// Recurrence coefficient `a` for a sample rate
    pub fn coefficient(&self, sample_rate: u32) -> f64 {
        let dt = 1.0 / f64::from(sample_rate);
        let rc = 1.0 / (2.0 * PI * self.cutoff_hz);
        rc / (rc + dt)
    }

    /// Filter a buffer, returning a new buffer of the same shape
    pub fn process(&self, buffer: &AudioBuffer) -> AudioBuffer {
        let channels = buffer.channels();
        if buffer.is_empty() || channels == 0 {
            return buffer.clone();
        }

        let a = self.coefficient(buffer.sample_rate());
        let mut states = vec![OnePoleState::default(); channels];
        let mut output = Vec::with_capacity(buffer.len());

        for frame in buffer.samples.chunks_exact(channels) {
            for (state, &sample) in states.iter_mut().zip(frame) {
                output.push(state.process(f64::from(sample), a) as f32);
            }
        }

        buffer.with_samples(output)
    }
}

impl Default for HighPassFilter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HIGHPASS_CUTOFF_HZ)
    }
}
