//! Final peak ceiling
//!
//! Despite the name this works on sample peaks. Inter-sample peaks are not
//! estimated, so a reconstructed waveform can still overshoot the ceiling
//! slightly.

use onair_core::AudioBuffer;

/// Largest absolute sample value, 0.0 for an empty buffer
pub fn sample_peak(buffer: &AudioBuffer) -> f32 {
    buffer.peak()
}

/// Scales a buffer down when its sample peak exceeds a ceiling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruePeakGuard {
    ceiling: f32,
}

impl TruePeakGuard {
    /// Guard with a linear ceiling
    pub fn new(ceiling: f32) -> Self {
        Self { ceiling }
    }

    /// Guard with a ceiling in dBFS
    pub fn from_db(ceiling_db: f64) -> Self {
        Self::new(crate::db_to_linear(ceiling_db) as f32)
    }

    /// Linear ceiling
    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    /// Enforce the ceiling, returning a new buffer
    ///
    /// Buffers at or below the ceiling (zero peak included) are returned
    /// unchanged.
    pub fn process(&self, buffer: &AudioBuffer) -> AudioBuffer {
        let peak = sample_peak(buffer);
        if peak <= self.ceiling || peak == 0.0 {
            return buffer.clone();
        }

        let scale = self.ceiling / peak;
        tracing::debug!(peak, ceiling = self.ceiling, scale, "Peak guard scaling buffer");
        // Rounding can leave a sample a hair above the ceiling; clamp it
        let ceiling = self.ceiling;
        buffer.with_samples(
            buffer
                .samples
                .iter()
                .map(|&s| (s * scale).clamp(-ceiling, ceiling))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onair_core::{AudioFormat, SampleRate};

    fn buffer(samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::new(samples, AudioFormat::new(SampleRate::CD_QUALITY, 1, 32))
    }

    #[test]
    fn scales_down_hot_buffer() {
        let guard = TruePeakGuard::from_db(-1.0);
        let out = guard.process(&buffer(vec![0.5, -0.95, 0.2]));
        assert!((sample_peak(&out) - 0.891_250_9).abs() < 1e-6);
        // Relative levels preserved
        assert!((out.samples[0] / out.samples[2] - 2.5).abs() < 1e-5);
    }

    #[test]
    fn leaves_quiet_buffer_alone() {
        let input = buffer(vec![0.5, -0.3]);
        let out = TruePeakGuard::from_db(-1.0).process(&input);
        assert_eq!(out, input);
    }

    #[test]
    fn zero_peak_is_noop() {
        let input = buffer(vec![0.0; 16]);
        let out = TruePeakGuard::new(0.0).process(&input);
        assert_eq!(out, input);
    }

    #[test]
    fn sample_peak_of_empty_is_zero() {
        assert_eq!(sample_peak(&buffer(vec![])), 0.0);
    }
}
