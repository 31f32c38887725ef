//! Offline mastering chain for Onair
//!
//! Turns a decoded buffer into a "radio-ready" master: rumble removed,
//! loudness normalized to a target and peaks held under a ceiling.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ PCM samples │ ──► │  Normalizer  │ ──► │  High-pass   │ ──► │    Meter    │
//! └─────────────┘     └──────────────┘     └──────────────┘     └─────────────┘
//!                                                                      │
//!                                                                      ▼
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   Master    │ ◄── │  Peak guard  │ ◄── │ Soft limiter │ ◄── │ Gain stage  │
//! └─────────────┘     └──────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use onair_dsp::{master, normalize, MasteringConfig};
//!
//! let buffer = normalize(&pcm_i16, 2, 44_100)?;
//! let result = master(&buffer, &MasteringConfig::with_target(-16.0))?;
//!
//! println!("Applied {:+.2} dB", result.applied_gain_db);
//! ```

#![forbid(unsafe_code)]

mod config;
mod error;
mod gain;
mod highpass;
mod kweighting;
mod limiter;
mod meter;
mod normalizer;
mod peak;
mod pipeline;

pub use config::{
    MasteringConfig, DEFAULT_HIGHPASS_CUTOFF_HZ, DEFAULT_LIMITER_THRESHOLD, DEFAULT_MAX_GAIN_DB,
    DEFAULT_PEAK_CEILING_DB, DEFAULT_TARGET_LUFS,
};
pub use error::{DspError, Result};
pub use gain::{apply_gain, compute_gain_db, GainStage};
pub use highpass::{HighPassFilter, OnePoleState};
pub use kweighting::{BiquadCoeffs, KWeighting};
pub use limiter::SoftLimiter;
pub use meter::{
    measure_integrated, LoudnessMeasurement, LoudnessMeter, ABSOLUTE_GATE_LUFS, RELATIVE_GATE_LU,
};
pub use normalizer::{normalize, normalize_bytes, Int24, PcmSample, SampleFormat, SampleKind};
pub use peak::{sample_peak, TruePeakGuard};
pub use pipeline::{analyze, master, LoudnessReport, MasteringNotice, MasteringResult};

/// Convert decibels to a linear amplitude factor
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear amplitude factor to decibels (`-∞` for zero)
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}
