//! Mastering configuration

use crate::error::{DspError, Result};
use crate::meter::ABSOLUTE_GATE_LUFS;
use onair_core::SampleRate;
use serde::{Deserialize, Serialize};

/// Default integrated loudness target (streaming platforms)
pub const DEFAULT_TARGET_LUFS: f64 = -14.0;

/// Default high-pass cutoff for rumble removal
pub const DEFAULT_HIGHPASS_CUTOFF_HZ: f64 = 80.0;

/// Default soft limiter threshold (linear)
pub const DEFAULT_LIMITER_THRESHOLD: f32 = 0.95;

/// Default sample-peak ceiling in dBFS
pub const DEFAULT_PEAK_CEILING_DB: f64 = -1.0;

/// Gain applied when the measured loudness is undefined (silence)
pub const DEFAULT_MAX_GAIN_DB: f64 = 24.0;

/// Parameters for one mastering run
///
/// Every field has a serde default so a partial table in a configuration
/// file (or an empty one) deserializes to the stock chain.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MasteringConfig {
    /// Integrated loudness target in LUFS
    #[serde(default = "default_target_lufs")]
    pub target_lufs: f64,

    /// Cutoff of the one-pole rumble filter in Hz
    #[serde(default = "default_highpass_cutoff_hz")]
    pub highpass_cutoff_hz: f64,

    /// Soft limiter threshold in (0, 1]; other values fall back to 0.95
    #[serde(default = "default_limiter_threshold")]
    pub limiter_threshold: f32,

    /// Final sample-peak ceiling in dBFS (must be <= 0)
    #[serde(default = "default_peak_ceiling_db")]
    pub peak_ceiling_db: f64,

    /// Gain applied when the input loudness is undefined (silence)
    #[serde(default = "default_max_gain_db")]
    pub max_gain_db: f64,
}

impl MasteringConfig {
    /// Stock configuration with a different loudness target
    pub fn with_target(target_lufs: f64) -> Self {
        Self {
            target_lufs,
            ..Self::default()
        }
    }

    /// Validate the parameters that do not depend on the buffer
    ///
    /// The limiter threshold is deliberately not checked here: an invalid
    /// threshold is replaced at the limiter stage instead of failing.
    pub fn validate(&self) -> Result<()> {
        check_finite("target_lufs", self.target_lufs)?;
        check_finite("highpass_cutoff_hz", self.highpass_cutoff_hz)?;
        check_finite("peak_ceiling_db", self.peak_ceiling_db)?;
        check_finite("max_gain_db", self.max_gain_db)?;

        if self.highpass_cutoff_hz <= 0.0 {
            return Err(DspError::config(format!(
                "highpass_cutoff_hz must be positive, got {}",
                self.highpass_cutoff_hz
            )));
        }
        if self.peak_ceiling_db > 0.0 {
            return Err(DspError::config(format!(
                "peak_ceiling_db must not exceed 0 dBFS, got {}",
                self.peak_ceiling_db
            )));
        }

        // Gated loudness never falls below the absolute gate, which bounds
        // the largest gain a measured input can ask for.
        check_gain("max_gain_db", self.max_gain_db)?;
        check_gain("target_lufs", self.target_lufs - ABSOLUTE_GATE_LUFS)?;
        Ok(())
    }

    /// Validate against a concrete sample rate
    ///
    /// Adds the Nyquist bound on the high-pass cutoff.
    pub fn validate_for(&self, sample_rate: u32) -> Result<()> {
        self.validate()?;

        let nyquist = SampleRate::new(sample_rate).nyquist();
        if self.highpass_cutoff_hz >= nyquist {
            return Err(DspError::config(format!(
                "highpass_cutoff_hz {} Hz is not below Nyquist ({} Hz)",
                self.highpass_cutoff_hz, nyquist
            )));
        }
        Ok(())
    }

    /// Linear sample-peak ceiling
    pub fn peak_ceiling_linear(&self) -> f32 {
        crate::db_to_linear(self.peak_ceiling_db) as f32
    }
}

impl Default for MasteringConfig {
    fn default() -> Self {
        Self {
            target_lufs: default_target_lufs(),
            highpass_cutoff_hz: default_highpass_cutoff_hz(),
            limiter_threshold: default_limiter_threshold(),
            peak_ceiling_db: default_peak_ceiling_db(),
            max_gain_db: default_max_gain_db(),
        }
    }
}

fn check_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DspError::config(format!("{} must be finite, got {}", name, value)))
    }
}

/// The gain stage multiplies in f32; reject gains that overflow it
fn check_gain(name: &str, gain_db: f64) -> Result<()> {
    if (crate::db_to_linear(gain_db) as f32).is_finite() {
        Ok(())
    } else {
        Err(DspError::config(format!(
            "{} implies a gain of {:.1} dB, beyond f32 range",
            name, gain_db
        )))
    }
}

// Default values
fn default_target_lufs() -> f64 {
    DEFAULT_TARGET_LUFS
}

fn default_highpass_cutoff_hz() -> f64 {
    DEFAULT_HIGHPASS_CUTOFF_HZ
}

fn default_limiter_threshold() -> f32 {
    DEFAULT_LIMITER_THRESHOLD
}

fn default_peak_ceiling_db() -> f64 {
    DEFAULT_PEAK_CEILING_DB
}

fn default_max_gain_db() -> f64 {
    DEFAULT_MAX_GAIN_DB
}
