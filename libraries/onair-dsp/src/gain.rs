//! Loudness-correcting gain stage

use crate::meter::LoudnessMeasurement;
use onair_core::AudioBuffer;

/// Gain needed to move `measured` onto `target`, in dB
///
/// Undefined loudness (silence or any non-finite measurement) yields
/// `max_gain_db`. A measured loudness is corrected exactly, however far it
/// sits from the target.
pub fn compute_gain_db(target_lufs: f64, measured_lufs: f64, max_gain_db: f64) -> f64 {
    if !measured_lufs.is_finite() {
        return max_gain_db;
    }
    target_lufs - measured_lufs
}

/// Static gain applied to every sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainStage {
    gain_db: f64,
}

impl GainStage {
    /// Gain stage with a fixed dB value
    pub fn new(gain_db: f64) -> Self {
        Self { gain_db }
    }

    /// Gain stage that brings a measurement to the target loudness
    pub fn for_target(measurement: &LoudnessMeasurement, target_lufs: f64, max_gain_db: f64) -> Self {
        Self::new(compute_gain_db(
            target_lufs,
            measurement.integrated_lufs,
            max_gain_db,
        ))
    }

    /// Gain in dB
    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    /// Linear multiplier
    pub fn gain_linear(&self) -> f32 {
        crate::db_to_linear(self.gain_db) as f32
    }

    /// Apply the gain, returning a new buffer
    pub fn process(&self, buffer: &AudioBuffer) -> AudioBuffer {
        apply_gain(buffer, self.gain_linear())
    }
}

/// Multiply every sample by a linear gain
pub fn apply_gain(buffer: &AudioBuffer, gain_linear: f32) -> AudioBuffer {
    buffer.with_samples(buffer.samples.iter().map(|s| s * gain_linear).collect())
}
