//! Gated integrated loudness (ITU-R BS.1770 style)
//!
//! The meter is a plain value parameterized by sample rate. It keeps no
//! signal state between calls, so one meter can measure any number of
//! buffers at that rate.
//!
//! Algorithm:
//! 1. K-weight each channel ([`KWeighting`]).
//! 2. Cut the weighted signal into 400 ms blocks every 100 ms (75 % overlap).
//!    Only complete blocks are used.
//! 3. Per block, sum the mean square of the first two channels with weight
//!    1.0. Channels beyond the second are ignored (see below).
//! 4. Block loudness is `-0.691 + 10·log10(z)`; `z = 0` is `-∞` and dropped.
//! 5. Drop blocks below the absolute gate of -70 LUFS.
//! 6. Drop blocks more than 10 LU below the energy average of the survivors.
//! 7. The energy average of what is left is the integrated loudness.
//!
//! If no block survives, the result is `-∞` and
//! [`LoudnessMeasurement::is_silent`] is true.
//!
//! Multichannel policy: only channels 0 and 1 contribute. Centre and surround
//! channels are not weighted as BS.1770 prescribes. This has not been
//! calibrated against a multichannel reference and should not be trusted for
//! loudness compliance of surround material.

use crate::kweighting::KWeighting;
use onair_core::AudioBuffer;
use std::fmt;

/// Absolute gating threshold
pub const ABSOLUTE_GATE_LUFS: f64 = -70.0;

/// Relative gating threshold, below the ungated average
pub const RELATIVE_GATE_LU: f64 = -10.0;

/// Analysis block length in seconds
pub const BLOCK_SECONDS: f64 = 0.4;

/// Hop between block starts in seconds
pub const HOP_SECONDS: f64 = 0.1;

/// Channels that contribute to the block energy
pub const MAX_METERED_CHANNELS: usize = 2;

const LOUDNESS_OFFSET: f64 = -0.691;

/// Result of one integrated loudness measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessMeasurement {
    /// Integrated loudness in LUFS, `f64::NEG_INFINITY` for silence
    pub integrated_lufs: f64,
    /// Number of complete analysis blocks
    pub block_count: usize,
    /// Blocks that survived both gates
    pub gated_block_count: usize,
}

impl LoudnessMeasurement {
    /// Measurement for a buffer with nothing to measure
    pub fn silent(block_count: usize) -> Self {
        Self {
            integrated_lufs: f64::NEG_INFINITY,
            block_count,
            gated_block_count: 0,
        }
    }

    /// Whether the loudness is undefined (no block survived gating)
    pub fn is_silent(&self) -> bool {
        !self.integrated_lufs.is_finite()
    }

    /// Integrated loudness, or `None` for silence
    pub fn lufs(&self) -> Option<f64> {
        if self.is_silent() {
            None
        } else {
            Some(self.integrated_lufs)
        }
    }
}

impl fmt::Display for LoudnessMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lufs() {
            Some(lufs) => write!(
                f,
                "{:.1} LUFS ({}/{} blocks gated in)",
                lufs, self.gated_block_count, self.block_count
            ),
            None => write!(f, "silent ({} blocks, none above gate)", self.block_count),
        }
    }
}

/// Integrated loudness meter for one sample rate
#[derive(Debug, Clone, Copy)]
pub struct LoudnessMeter {
    weighting: KWeighting,
    block_len: usize,
    hop_len: usize,
}

impl LoudnessMeter {
    /// Create a meter for a sample rate
    pub fn new(sample_rate: u32) -> Self {
        let fs = f64::from(sample_rate);
        Self {
            weighting: KWeighting::new(sample_rate),
            block_len: ((fs * BLOCK_SECONDS).round() as usize).max(1),
            hop_len: ((fs * HOP_SECONDS).round() as usize).max(1),
        }
    }

    /// Block length in samples
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Hop length in samples
    pub fn hop_len(&self) -> usize {
        self.hop_len
    }

    /// Number of complete blocks in a channel of `frames` samples
    pub fn block_count(&self, frames: usize) -> usize {
        if frames < self.block_len {
            0
        } else {
            (frames - self.block_len) / self.hop_len + 1
        }
    }

    /// Measure integrated loudness of a buffer
    ///
    /// The buffer's sample rate should match the meter's; use
    /// [`measure_integrated`] to derive the meter from the buffer.
    pub fn measure(&self, buffer: &AudioBuffer) -> LoudnessMeasurement {
        let energies = self.block_energies(buffer);
        let block_count = energies.len();

        let loudness: Vec<f64> = energies.iter().map(|&z| block_loudness(z)).collect();

        // Absolute gate (non-finite blocks are already -inf or NaN and fail here)
        let above_absolute: Vec<usize> = (0..block_count)
            .filter(|&j| loudness[j].is_finite() && loudness[j] >= ABSOLUTE_GATE_LUFS)
            .collect();
        if above_absolute.is_empty() {
            tracing::debug!(block_count, "No loudness blocks above absolute gate");
            return LoudnessMeasurement::silent(block_count);
        }

        // Relative gate
        let relative_threshold = mean_loudness(&energies, &above_absolute) + RELATIVE_GATE_LU;
        let gated: Vec<usize> = above_absolute
            .into_iter()
            .filter(|&j| loudness[j] >= relative_threshold)
            .collect();
        if gated.is_empty() {
            return LoudnessMeasurement::silent(block_count);
        }

        let integrated_lufs = mean_loudness(&energies, &gated);
        tracing::debug!(
            integrated_lufs,
            relative_threshold,
            block_count,
            gated = gated.len(),
            "Measured integrated loudness"
        );

        LoudnessMeasurement {
            integrated_lufs,
            block_count,
            gated_block_count: gated.len(),
        }
    }

    /// Channel-summed mean square of every complete block
    fn block_energies(&self, buffer: &AudioBuffer) -> Vec<f64> {
        let channels = buffer.channels();
        let block_count = self.block_count(buffer.frames());
        let mut energies = vec![0.0_f64; block_count];
        if block_count == 0 {
            return energies;
        }

        let metered = channels.min(MAX_METERED_CHANNELS);
        for channel in 0..metered {
            let weighted = self
                .weighting
                .filter_channel(&buffer.samples, channels, channel);

            // Prefix sums of squares so each block is O(1)
            let mut prefix = Vec::with_capacity(weighted.len() + 1);
            prefix.push(0.0_f64);
            let mut acc = 0.0_f64;
            for sample in &weighted {
                acc += sample * sample;
                prefix.push(acc);
            }

            for (j, energy) in energies.iter_mut().enumerate() {
                let start = j * self.hop_len;
                let end = start + self.block_len;
                *energy += (prefix[end] - prefix[start]) / self.block_len as f64;
            }
        }

        energies
    }
}

/// Measure a buffer with a meter derived from its own sample rate
pub fn measure_integrated(buffer: &AudioBuffer) -> LoudnessMeasurement {
    LoudnessMeter::new(buffer.sample_rate()).measure(buffer)
}

/// Loudness of one block's summed mean square
fn block_loudness(z: f64) -> f64 {
    if z > 0.0 {
        LOUDNESS_OFFSET + 10.0 * z.log10()
    } else {
        f64::NEG_INFINITY
    }
}

/// Energy-average loudness of the selected blocks
fn mean_loudness(energies: &[f64], selected: &[usize]) -> f64 {
    let sum: f64 = selected.iter().map(|&j| energies[j]).sum();
    block_loudness(sum / selected.len() as f64)
}
