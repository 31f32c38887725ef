//! Property-based tests for the mastering chain
//!
//! These tests use proptest to verify invariants across many random inputs.

use onair_core::{AudioBuffer, AudioFormat, SampleRate};
use onair_dsp::{
    master, sample_peak, HighPassFilter, MasteringConfig, SoftLimiter, TruePeakGuard,
};
use proptest::prelude::*;

// Helper: Check if buffer contains only finite values
fn all_finite(buffer: &[f32]) -> bool {
    buffer.iter().all(|s| s.is_finite())
}

fn buffer(samples: Vec<f32>, channels: u16) -> AudioBuffer {
    AudioBuffer::new(samples, AudioFormat::new(SampleRate::CD_QUALITY, channels, 32))
}

proptest! {
    /// Property: limiter output never exceeds its threshold
    #[test]
    fn limiter_is_bounded(
        threshold in 0.01f32..=1.0,
        x in -1.0e6f32..1.0e6,
    ) {
        let limiter = SoftLimiter::new(threshold);
        let y = limiter.limit(x);
        prop_assert!(y.abs() <= threshold, "|{}| > {}", y, threshold);
    }

    /// Property: limiter is monotonic and odd-symmetric
    #[test]
    fn limiter_is_monotonic_and_odd(
        threshold in 0.01f32..=1.0,
        a in -10.0f32..10.0,
        b in -10.0f32..10.0,
    ) {
        let limiter = SoftLimiter::new(threshold);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(limiter.limit(lo) <= limiter.limit(hi));
        prop_assert_eq!(limiter.limit(-a), -limiter.limit(a));
    }

    /// Property: peak guard always respects its ceiling
    #[test]
    fn peak_guard_respects_ceiling(
        ceiling_db in -20.0f64..=0.0,
        samples in prop::collection::vec(-4.0f32..4.0, 1..2000),
    ) {
        let guard = TruePeakGuard::from_db(ceiling_db);
        let out = guard.process(&buffer(samples, 1));
        prop_assert!(sample_peak(&out) <= guard.ceiling() + 1e-6);
    }

    /// Property: high-pass preserves shape and never produces NaN or Inf
    #[test]
    fn highpass_preserves_shape(
        channels in 1u16..=6,
        frames in 0usize..500,
        cutoff in 10.0f64..2000.0,
    ) {
        let samples: Vec<f32> = (0..frames * channels as usize)
            .map(|i| ((i * 7919) % 200) as f32 / 100.0 - 1.0)
            .collect();
        let input = buffer(samples, channels);
        let out = HighPassFilter::new(cutoff).process(&input);
        prop_assert_eq!(out.len(), input.len());
        prop_assert_eq!(out.format, input.format);
        prop_assert!(all_finite(&out.samples));
    }

    /// Property: mastering preserves shape and ceiling for arbitrary material
    #[test]
    fn master_preserves_shape_and_ceiling(
        channels in 1u16..=3,
        samples in prop::collection::vec(-1.0f32..1.0, 0..30_000),
        target in -30.0f64..-6.0,
    ) {
        let usable = samples.len() - samples.len() % channels as usize;
        let input = buffer(samples[..usable].to_vec(), channels);
        let config = MasteringConfig::with_target(target);

        let result = master(&input, &config).unwrap();
        prop_assert_eq!(result.buffer.len(), input.len());
        prop_assert_eq!(result.buffer.format, input.format);
        prop_assert!(all_finite(&result.buffer.samples));
        prop_assert!(result.peak_after <= config.peak_ceiling_linear() + 1e-6);
    }
}
