//! Mastering chain orchestration
//!
//! ```text
//! input ─► sanitize ─► high-pass ─► measure ─► gain ─► soft limit ─► peak guard ─► output
//!                                      │                                             │
//!                                      └── loudness_before          loudness_after ──┘
//! ```
//!
//! Every stage returns a new buffer. Nothing is kept between calls, so the
//! same input and configuration always produce the same output.

use crate::config::MasteringConfig;
use crate::error::Result;
use crate::gain::GainStage;
use crate::highpass::HighPassFilter;
use crate::limiter::SoftLimiter;
use crate::meter::{measure_integrated, LoudnessMeasurement};
use crate::peak::{sample_peak, TruePeakGuard};
use onair_core::AudioBuffer;
use std::fmt;

/// Non-fatal condition met while mastering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MasteringNotice {
    /// Input loudness was undefined; the maximum gain was applied
    Silence,
    /// NaN or infinite input samples were replaced by zero
    NonFiniteSamples {
        /// Number of replaced samples
        count: usize,
    },
    /// The chain produced NaN or infinite samples, which were zeroed
    NonFiniteOutput {
        /// Number of replaced samples
        count: usize,
    },
    /// Limiter threshold was outside (0, 1] and the default was used
    LimiterThresholdReset {
        /// Rejected threshold
        requested: f32,
    },
}

impl fmt::Display for MasteringNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silence => write!(f, "input is silent, applied maximum gain"),
            Self::NonFiniteSamples { count } => {
                write!(f, "replaced {} non-finite samples with silence", count)
            }
            Self::NonFiniteOutput { count } => {
                write!(f, "zeroed {} non-finite output samples", count)
            }
            Self::LimiterThresholdReset { requested } => {
                write!(f, "limiter threshold {} is outside (0, 1], used default", requested)
            }
        }
    }
}

/// Output of one mastering run
#[derive(Debug, Clone, PartialEq)]
pub struct MasteringResult {
    /// Mastered audio, same shape and sample rate as the input
    pub buffer: AudioBuffer,
    /// Gain applied by the gain stage, in dB
    pub applied_gain_db: f64,
    /// Integrated loudness after the high-pass, `None` for silence
    pub loudness_before: Option<f64>,
    /// Integrated loudness of the output, `None` for silence
    pub loudness_after: Option<f64>,
    /// Linear sample peak of the (sanitized) input
    pub peak_before: f32,
    /// Linear sample peak of the output
    pub peak_after: f32,
    /// Non-fatal conditions, in the order they occurred
    pub notices: Vec<MasteringNotice>,
}

impl MasteringResult {
    /// Whether the input was treated as silence
    pub fn is_silent_input(&self) -> bool {
        self.notices.contains(&MasteringNotice::Silence)
    }
}

/// Master a buffer to the configured loudness target
///
/// # Errors
/// `Config` for invalid configuration, or a layout error when the buffer
/// itself is malformed. Silence, zero peaks and non-finite samples are not
/// errors; they are reported through [`MasteringResult::notices`].
pub fn master(buffer: &AudioBuffer, config: &MasteringConfig) -> Result<MasteringResult> {
    buffer.validate()?;
    config.validate_for(buffer.sample_rate())?;

    let span = tracing::debug_span!(
        "master",
        channels = buffer.channels(),
        frames = buffer.frames(),
        sample_rate = buffer.sample_rate(),
        target_lufs = config.target_lufs,
    );
    let _enter = span.enter();

    let mut notices = Vec::new();

    let (input, replaced) = sanitize(buffer);
    if replaced > 0 {
        tracing::warn!(count = replaced, "Replaced non-finite input samples");
        notices.push(MasteringNotice::NonFiniteSamples { count: replaced });
    }
    let peak_before = sample_peak(&input);

    let filtered = HighPassFilter::new(config.highpass_cutoff_hz).process(&input);
    tracing::debug!(cutoff_hz = config.highpass_cutoff_hz, "High-pass applied");

    let before = measure_integrated(&filtered);
    if before.is_silent() {
        tracing::debug!("Input loudness undefined, treating as silence");
        notices.push(MasteringNotice::Silence);
    }

    let gain = GainStage::for_target(&before, config.target_lufs, config.max_gain_db);
    let gained = gain.process(&filtered);
    tracing::debug!(gain_db = gain.gain_db(), measured = %before, "Gain applied");

    let limiter = SoftLimiter::new(config.limiter_threshold);
    if let Some(requested) = limiter.reset_from() {
        notices.push(MasteringNotice::LimiterThresholdReset { requested });
    }
    let limited = limiter.process(&gained);
    tracing::debug!(threshold = limiter.threshold(), "Soft limiter applied");

    let guarded = TruePeakGuard::from_db(config.peak_ceiling_db).process(&limited);
    let (output, stray) = sanitize(&guarded);
    if stray > 0 {
        tracing::warn!(count = stray, "Chain produced non-finite samples");
        notices.push(MasteringNotice::NonFiniteOutput { count: stray });
    }
    let peak_after = sample_peak(&output);
    let after = measure_integrated(&output);
    tracing::debug!(peak_after, loudness_after = %after, "Peak guard applied");

    Ok(MasteringResult {
        buffer: output,
        applied_gain_db: gain.gain_db(),
        loudness_before: before.lufs(),
        loudness_after: after.lufs(),
        peak_before,
        peak_after,
        notices,
    })
}

/// Replace NaN and infinite samples with zero, returning the replacement count
fn sanitize(buffer: &AudioBuffer) -> (AudioBuffer, usize) {
    let mut replaced = 0;
    let samples = buffer
        .samples
        .iter()
        .map(|&s| {
            if s.is_finite() {
                s
            } else {
                replaced += 1;
                0.0
            }
        })
        .collect();
    (buffer.with_samples(samples), replaced)
}

/// Loudness and peak summary of an unprocessed buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessReport {
    /// Gated integrated loudness
    pub loudness: LoudnessMeasurement,
    /// Linear sample peak
    pub sample_peak: f32,
    /// Sample peak in dBFS, `-∞` for digital silence
    pub sample_peak_dbfs: f64,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Channel count
    pub channels: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl fmt::Display for LoudnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Format:    {} ch @ {} Hz, {:.2} s",
            self.channels, self.sample_rate, self.duration_secs
        )?;
        writeln!(f, "Loudness:  {}", self.loudness)?;
        write!(f, "Peak:      {:.2} dBFS", self.sample_peak_dbfs)
    }
}

/// Measure a buffer without processing it
pub fn analyze(buffer: &AudioBuffer) -> LoudnessReport {
    let peak = sample_peak(buffer);
    LoudnessReport {
        loudness: measure_integrated(buffer),
        sample_peak: peak,
        sample_peak_dbfs: crate::linear_to_db(f64::from(peak)),
        duration_secs: buffer.duration_secs(),
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
    }
}
