//! End-to-end tests for the mastering chain
//!
//! Each test feeds a synthetic signal through `master` and checks the
//! diagnostics and output buffer as a whole.

use onair_core::{AudioBuffer, AudioFormat, SampleRate};
use onair_dsp::{
    analyze, master, normalize, DspError, MasteringConfig, MasteringNotice, DEFAULT_MAX_GAIN_DB,
};
use std::f64::consts::PI;

fn sine(sample_rate: u32, channels: u16, freq: f64, amplitude: f64, secs: f64) -> AudioBuffer {
    let frames = (f64::from(sample_rate) * secs) as usize;
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for i in 0..frames {
        let s = (amplitude * (2.0 * PI * freq * i as f64 / f64::from(sample_rate)).sin()) as f32;
        for _ in 0..channels {
            samples.push(s);
        }
    }
    AudioBuffer::new(samples, AudioFormat::new(SampleRate::new(sample_rate), channels, 16))
}

#[test]
fn test_stereo_997hz_is_brought_to_target() {
    let input = sine(44_100, 2, 997.0, 0.5, 2.0);
    let result = master(&input, &MasteringConfig::default()).unwrap();

    let before = result.loudness_before.unwrap();
    assert!((before + 6.14).abs() < 0.3, "loudness before {:.3}", before);
    assert!(result.applied_gain_db < 0.0);
    assert!(result.peak_after <= 0.891_3, "peak after {}", result.peak_after);
    assert!((result.peak_before - 0.5).abs() < 1e-3);

    let after = result.loudness_after.unwrap();
    assert!((after + 14.0).abs() < 0.5, "loudness after {:.3}", after);
    assert!(result.notices.is_empty());
}

#[test]
fn test_shape_and_rate_are_preserved() {
    for (rate, channels) in [(44_100, 1), (48_000, 2), (96_000, 6)] {
        let input = sine(rate, channels, 440.0, 0.3, 1.0);
        let result = master(&input, &MasteringConfig::default()).unwrap();
        assert_eq!(result.buffer.len(), input.len());
        assert_eq!(result.buffer.frames(), input.frames());
        assert_eq!(result.buffer.format.channels, channels);
        assert_eq!(result.buffer.sample_rate(), rate);
    }
}

#[test]
fn test_silence_in_silence_out() {
    let input = AudioBuffer::new(vec![0.0; 88_200], AudioFormat::cd_quality());
    let result = master(&input, &MasteringConfig::default()).unwrap();

    assert_eq!(result.applied_gain_db, DEFAULT_MAX_GAIN_DB);
    assert!(result.buffer.samples.iter().all(|&s| s == 0.0));
    assert_eq!(result.loudness_before, None);
    assert_eq!(result.loudness_after, None);
    assert_eq!(result.peak_after, 0.0);
    assert!(result.is_silent_input());
}

#[test]
fn test_empty_buffer_is_not_an_error() {
    let input = AudioBuffer::new(vec![], AudioFormat::cd_quality());
    let result = master(&input, &MasteringConfig::default()).unwrap();
    assert!(result.buffer.is_empty());
    assert_eq!(result.notices, vec![MasteringNotice::Silence]);
}

#[test]
fn test_remastering_is_nearly_idempotent() {
    let config = MasteringConfig::default();
    for input in [
        sine(44_100, 2, 997.0, 0.5, 3.0),
        sine(44_100, 2, 440.0, 0.05, 3.0),
    ] {
        let first = master(&input, &config).unwrap();
        let second = master(&first.buffer, &config).unwrap();
        assert!(
            second.applied_gain_db.abs() <= 0.5,
            "second pass applied {:.3} dB",
            second.applied_gain_db
        );
    }
}

#[test]
fn test_non_finite_samples_are_zeroed_and_reported() {
    let mut input = sine(48_000, 2, 997.0, 0.5, 1.0);
    input.samples[10] = f32::NAN;
    input.samples[11] = f32::INFINITY;
    input.samples[500] = f32::NEG_INFINITY;

    let result = master(&input, &MasteringConfig::default()).unwrap();
    assert!(result.buffer.samples.iter().all(|s| s.is_finite()));
    assert!(result
        .notices
        .contains(&MasteringNotice::NonFiniteSamples { count: 3 }));
}

#[test]
fn test_quiet_input_reaches_target() {
    // 0.001 amplitude measures about -60 LUFS, far beyond the silence gain
    let input = sine(44_100, 2, 997.0, 0.001, 2.0);
    let result = master(&input, &MasteringConfig::default()).unwrap();

    let before = result.loudness_before.unwrap();
    assert!((result.applied_gain_db - (-14.0 - before)).abs() < 1e-9);
    assert!(result.applied_gain_db > DEFAULT_MAX_GAIN_DB);
    let after = result.loudness_after.unwrap();
    assert!((after + 14.0).abs() < 0.5, "after {:.3}", after);
    assert!(result.notices.is_empty());
}

#[test]
fn test_silence_with_huge_gain_stays_finite() {
    let input = AudioBuffer::new(vec![0.0; 88_200], AudioFormat::new(SampleRate::CD_QUALITY, 2, 16));

    let mut config = MasteringConfig::default();
    config.max_gain_db = 800.0;
    assert!(matches!(master(&input, &config), Err(DspError::Config(_))));

    config.max_gain_db = 700.0;
    let result = master(&input, &config).unwrap();
    assert!(result.buffer.samples.iter().all(|s| *s == 0.0));
    assert_eq!(result.peak_after, 0.0);
    assert_eq!(result.notices, vec![MasteringNotice::Silence]);
}

#[test]
fn test_custom_target_and_ceiling() {
    let input = sine(48_000, 2, 997.0, 0.1, 2.0);
    let mut config = MasteringConfig::with_target(-23.0);
    config.peak_ceiling_db = -3.0;

    let result = master(&input, &config).unwrap();
    assert!(result.peak_after <= 0.708 + 1e-4);
    let after = result.loudness_after.unwrap();
    assert!((after + 23.0).abs() < 0.5, "after {:.3}", after);
}

#[test]
fn test_config_errors() {
    let input = sine(44_100, 2, 997.0, 0.5, 1.0);

    let mut config = MasteringConfig::default();
    config.highpass_cutoff_hz = 22_050.0;
    assert!(matches!(master(&input, &config), Err(DspError::Config(_))));

    let mut config = MasteringConfig::default();
    config.peak_ceiling_db = 1.0;
    assert!(matches!(master(&input, &config), Err(DspError::Config(_))));

    let mut config = MasteringConfig::default();
    config.max_gain_db = f64::NAN;
    assert!(matches!(master(&input, &config), Err(DspError::Config(_))));
}

#[test]
fn test_integer_pcm_through_chain() {
    let pcm: Vec<i16> = (0..88_200)
        .map(|i| ((i as f64 * 2.0 * PI * 997.0 / 44_100.0).sin() * 16_000.0) as i16)
        .collect();
    let buffer = normalize(&pcm, 2, 44_100).unwrap();
    let result = master(&buffer, &MasteringConfig::default()).unwrap();
    assert_eq!(result.buffer.len(), pcm.len());
    assert!(result.peak_after <= 0.891_3);
}

#[test]
fn test_analyze_matches_master_diagnostics_on_output() {
    let result = master(&sine(44_100, 2, 997.0, 0.5, 2.0), &MasteringConfig::default()).unwrap();
    let report = analyze(&result.buffer);
    assert_eq!(report.loudness.lufs(), result.loudness_after);
    assert_eq!(report.sample_peak, result.peak_after);
}
