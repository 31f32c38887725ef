//! ITU-R BS.1770 reference tests for the gated loudness meter
//!
//! Key points verified:
//! - 997 Hz reference tone at 0 dBFS reads -3.01 LKFS
//! - Absolute (-70 LKFS) and relative (-10 LU) gates
//! - Agreement with the `ebur128` crate on stereo material
//! - Multichannel and short-buffer policies

use ebur128::{EbuR128, Mode};
use onair_core::{AudioBuffer, AudioFormat, SampleRate};
use onair_dsp::{measure_integrated, LoudnessMeter};
use std::f64::consts::PI;

// ============================================================================
// Test Signal Generators
// ============================================================================

fn generate_sine_wave(
    sample_rate: u32,
    channels: u16,
    frequency_hz: f64,
    amplitude_linear: f64,
    duration_secs: f64,
) -> AudioBuffer {
    let num_frames = (f64::from(sample_rate) * duration_secs) as usize;
    let mut samples = Vec::with_capacity(num_frames * channels as usize);

    for i in 0..num_frames {
        let t = i as f64 / f64::from(sample_rate);
        let sample = (amplitude_linear * (2.0 * PI * frequency_hz * t).sin()) as f32;
        for _ in 0..channels {
            samples.push(sample);
        }
    }

    AudioBuffer::new(samples, AudioFormat::new(SampleRate::new(sample_rate), channels, 32))
}

fn db_to_amplitude(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Reference measurement from libebur128's Rust port
fn ebur128_integrated(buffer: &AudioBuffer) -> f64 {
    let mut meter = EbuR128::new(u32::from(buffer.format.channels), buffer.sample_rate(), Mode::I)
        .expect("ebur128 meter");
    meter.add_frames_f32(&buffer.samples).expect("add frames");
    meter.loudness_global().expect("global loudness")
}

// ============================================================================
// Calibration
// ============================================================================

#[test]
fn test_997hz_0dbfs_mono_reads_minus_3_01() {
    let buffer = generate_sine_wave(48_000, 1, 997.0, 1.0, 10.0);
    let m = measure_integrated(&buffer);
    assert!(
        (m.integrated_lufs + 3.01).abs() < 0.1,
        "Expected -3.01 LUFS, got {:.3}",
        m.integrated_lufs
    );
}

#[test]
fn test_calibration_holds_at_44_1k_and_96k() {
    for rate in [44_100, 96_000] {
        let buffer = generate_sine_wave(rate, 1, 997.0, 1.0, 5.0);
        let m = measure_integrated(&buffer);
        assert!(
            (m.integrated_lufs + 3.01).abs() < 0.1,
            "{} Hz: got {:.3}",
            rate,
            m.integrated_lufs
        );
    }
}

#[test]
fn test_minus_23_lufs_stereo_tone() {
    // Stereo 997 Hz: each channel contributes -3.01 + level, the sum adds 3.01
    // so a per-channel level of -23 dBFS reads -23 LUFS.
    let buffer = generate_sine_wave(48_000, 2, 997.0, db_to_amplitude(-23.0), 10.0);
    let m = measure_integrated(&buffer);
    assert!(
        (m.integrated_lufs + 23.0).abs() < 0.1,
        "Expected -23 LUFS, got {:.3}",
        m.integrated_lufs
    );
}

// ============================================================================
// Cross-check against ebur128
// ============================================================================

#[test]
fn test_matches_ebur128_on_stereo_tones() {
    for (freq, level_db) in [(997.0, -6.0), (100.0, -12.0), (5_000.0, -20.0), (440.0, -30.0)] {
        let buffer = generate_sine_wave(44_100, 2, freq, db_to_amplitude(level_db), 5.0);
        let ours = measure_integrated(&buffer).integrated_lufs;
        let reference = ebur128_integrated(&buffer);
        assert!(
            (ours - reference).abs() < 0.2,
            "{} Hz @ {} dB: ours {:.3}, ebur128 {:.3}",
            freq,
            level_db,
            ours,
            reference
        );
    }
}

#[test]
fn test_matches_ebur128_with_gated_passage() {
    let loud = generate_sine_wave(48_000, 2, 1_000.0, 0.5, 5.0);
    let quiet = generate_sine_wave(48_000, 2, 1_000.0, 0.5 * db_to_amplitude(-25.0), 5.0);
    let mut samples = loud.samples.clone();
    samples.extend_from_slice(&quiet.samples);
    let buffer = loud.with_samples(samples);

    let ours = measure_integrated(&buffer).integrated_lufs;
    let reference = ebur128_integrated(&buffer);
    assert!(
        (ours - reference).abs() < 0.2,
        "ours {:.3}, ebur128 {:.3}",
        ours,
        reference
    );
}

// ============================================================================
// Gating
// ============================================================================

#[test]
fn test_silence_gap_does_not_pull_loudness_down() {
    let tone = generate_sine_wave(48_000, 2, 997.0, 0.5, 3.0);
    let reference = measure_integrated(&tone).integrated_lufs;

    let mut samples = tone.samples.clone();
    samples.extend(std::iter::repeat(0.0).take(tone.samples.len()));
    samples.extend_from_slice(&tone.samples);
    let gapped = tone.with_samples(samples);

    let m = measure_integrated(&gapped);
    assert!(
        (m.integrated_lufs - reference).abs() < 0.5,
        "gap moved loudness from {:.2} to {:.2}",
        reference,
        m.integrated_lufs
    );
    assert!(m.gated_block_count < m.block_count);
}

#[test]
fn test_absolute_gate_yields_silence() {
    let buffer = generate_sine_wave(48_000, 2, 997.0, db_to_amplitude(-75.0), 3.0);
    let m = measure_integrated(&buffer);
    assert!(m.is_silent(), "expected silence, got {}", m);
}

#[test]
fn test_short_buffer_is_silent() {
    // 399 ms is one sample short of a full block at 48 kHz
    let meter = LoudnessMeter::new(48_000);
    let frames = meter.block_len() - 1;
    let buffer = AudioBuffer::new(
        vec![0.5; frames],
        AudioFormat::new(SampleRate::DVD_QUALITY, 1, 32),
    );
    let m = meter.measure(&buffer);
    assert!(m.is_silent());
    assert_eq!(m.block_count, 0);
}

// ============================================================================
// Multichannel policy
// ============================================================================

#[test]
fn test_channels_beyond_two_do_not_contribute() {
    let stereo = generate_sine_wave(48_000, 2, 997.0, 0.25, 3.0);
    let loud_surround = generate_sine_wave(48_000, 1, 200.0, 0.9, 3.0);

    let mut samples = Vec::with_capacity(stereo.frames() * 6);
    for (frame, surround) in stereo.samples.chunks_exact(2).zip(&loud_surround.samples) {
        samples.extend_from_slice(frame);
        samples.extend_from_slice(&[*surround; 4]);
    }
    let six = AudioBuffer::new(samples, AudioFormat::new(SampleRate::DVD_QUALITY, 6, 32));

    let a = measure_integrated(&stereo).integrated_lufs;
    let b = measure_integrated(&six).integrated_lufs;
    assert!((a - b).abs() < 1e-9, "stereo {:.4} vs 5.1 {:.4}", a, b);
}
