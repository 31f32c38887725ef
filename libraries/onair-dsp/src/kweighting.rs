//! K-weighting pre-filter (ITU-R BS.1770)
//!
//! Two cascaded biquads approximate the ear's loudness sensitivity:
//! 1. High shelf, about +4 dB above ~1.7 kHz (head acoustics)
//! 2. Second-order high-pass at ~38 Hz (RLB weighting)
//!
//! Coefficients are derived for the actual sample rate with the bilinear
//! transform rather than taken from the 48 kHz tables, so 44.1 kHz and
//! 96 kHz material is weighted correctly.
//!
//! This filter only feeds the loudness meter; it never touches the audio
//! that leaves the mastering chain.

use std::f64::consts::PI;

const SHELF_FREQUENCY_HZ: f64 = 1_681.974_450_955_533;
const SHELF_GAIN_DB: f64 = 3.999_843_853_973_347;
const SHELF_Q: f64 = 0.707_175_236_955_419_6;

const HIGHPASS_FREQUENCY_HZ: f64 = 38.135_470_876_024_44;
const HIGHPASS_Q: f64 = 0.500_327_037_323_877_3;

/// Biquad coefficients with the leading feedback term a0 normalized to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    /// Feedforward coefficient b0
    pub b0: f64,
    /// Feedforward coefficient b1
    pub b1: f64,
    /// Feedforward coefficient b2
    pub b2: f64,
    /// Feedback coefficient a1
    pub a1: f64,
    /// Feedback coefficient a2
    pub a2: f64,
}

impl BiquadCoeffs {
    /// K-weighting stage 1: high shelf
    pub fn high_shelf(sample_rate: u32) -> Self {
        let k = (PI * SHELF_FREQUENCY_HZ / f64::from(sample_rate)).tan();
        let k2 = k * k;
        let v0 = 10.0_f64.powf(SHELF_GAIN_DB / 20.0);
        let vb = v0.powf(0.499_666_774_154_541_6);

        let a0 = 1.0 + k / SHELF_Q + k2;
        Self {
            b0: (v0 + vb * k / SHELF_Q + k2) / a0,
            b1: 2.0 * (k2 - v0) / a0,
            b2: (v0 - vb * k / SHELF_Q + k2) / a0,
            a1: 2.0 * (k2 - 1.0) / a0,
            a2: (1.0 - k / SHELF_Q + k2) / a0,
        }
    }

    /// K-weighting stage 2: high-pass
    pub fn high_pass(sample_rate: u32) -> Self {
        let k = (PI * HIGHPASS_FREQUENCY_HZ / f64::from(sample_rate)).tan();
        let k2 = k * k;

        // Numerator stays at (1, -2, 1) as in the reference tables; only the
        // denominator is normalized.
        let a0 = 1.0 + k / HIGHPASS_Q + k2;
        Self {
            b0: 1.0,
            b1: -2.0,
            b2: 1.0,
            a1: 2.0 * (k2 - 1.0) / a0,
            a2: (1.0 - k / HIGHPASS_Q + k2) / a0,
        }
    }

    /// Magnitude response at a frequency, in dB
    pub fn magnitude_db(&self, frequency_hz: f64, sample_rate: u32) -> f64 {
        let w = 2.0 * PI * frequency_hz / f64::from(sample_rate);
        let (c1, s1) = (w.cos(), w.sin());
        let (c2, s2) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);

        let num = num_re * num_re + num_im * num_im;
        let den = den_re * den_re + den_im * den_im;
        10.0 * (num / den).log10()
    }
}

/// Direct form I state
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadState {
    #[inline]
    fn process(&mut self, input: f64, c: &BiquadCoeffs) -> f64 {
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

/// Coefficients of the full K-weighting cascade for one sample rate
///
/// Holds no signal state; [`KWeighting::filter_channel`] starts from zero
/// every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KWeighting {
    shelf: BiquadCoeffs,
    high_pass: BiquadCoeffs,
    sample_rate: u32,
}

impl KWeighting {
    /// Derive the cascade for a sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            shelf: BiquadCoeffs::high_shelf(sample_rate),
            high_pass: BiquadCoeffs::high_pass(sample_rate),
            sample_rate,
        }
    }

    /// Sample rate the coefficients were derived for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Combined magnitude response in dB
    pub fn magnitude_db(&self, frequency_hz: f64) -> f64 {
        self.shelf.magnitude_db(frequency_hz, self.sample_rate)
            + self.high_pass.magnitude_db(frequency_hz, self.sample_rate)
    }

    /// Filter one channel of an interleaved buffer
    ///
    /// Returns the weighted channel as contiguous `f64` samples.
    pub fn filter_channel(&self, interleaved: &[f32], channels: usize, channel: usize) -> Vec<f64> {
        let mut shelf_state = BiquadState::default();
        let mut high_pass_state = BiquadState::default();

        interleaved
            .iter()
            .skip(channel)
            .step_by(channels.max(1))
            .map(|&sample| {
                let shelved = shelf_state.process(f64::from(sample), &self.shelf);
                high_pass_state.process(shelved, &self.high_pass)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_coefficients_at_48k() {
        // ITU-R BS.1770-4, Table 1 and Table 2
        let shelf = BiquadCoeffs::high_shelf(48_000);
        assert!((shelf.b0 - 1.535_124_859_586_97).abs() < 1e-6);
        assert!((shelf.b1 + 2.691_696_189_406_38).abs() < 1e-6);
        assert!((shelf.b2 - 1.198_392_810_852_85).abs() < 1e-6);
        assert!((shelf.a1 + 1.690_659_293_182_41).abs() < 1e-6);
        assert!((shelf.a2 - 0.732_480_774_215_85).abs() < 1e-6);

        let hp = BiquadCoeffs::high_pass(48_000);
        assert_eq!((hp.b0, hp.b1, hp.b2), (1.0, -2.0, 1.0));
        assert!((hp.a1 + 1.990_047_454_833_98).abs() < 1e-6);
        assert!((hp.a2 - 0.990_072_250_366_21).abs() < 1e-6);
    }

    #[test]
    fn response_shape() {
        let k = KWeighting::new(48_000);
        // Reference tone sits slightly above unity, which the -0.691 offset cancels
        let at_997 = k.magnitude_db(997.0);
        assert!(at_997 > 0.5 && at_997 < 0.9, "997 Hz gain {:.3} dB", at_997);
        // High shelf plateau
        assert!((k.magnitude_db(10_000.0) - 4.0).abs() < 0.5);
        // RLB high-pass
        assert!(k.magnitude_db(10.0) < -15.0);
    }

    #[test]
    fn filter_channel_deinterleaves() {
        let k = KWeighting::new(44_100);
        let interleaved = vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let left = k.filter_channel(&interleaved, 2, 0);
        let right = k.filter_channel(&interleaved, 2, 1);
        assert_eq!(left.len(), 3);
        assert!(left[0] != 0.0);
        assert!(right.iter().all(|&s| s == 0.0));
    }
}
