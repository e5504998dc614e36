//! Colored noise floor (power spectral density ∝ 1/f^β).
//!
//! White Gaussian noise is shaped in the frequency domain: bin `k` is scaled
//! by `k^(-β/2)`, which scales power by `k^-β`. The DC bin is zeroed. After
//! the inverse transform the signal is rescaled to the requested RMS level.
//!
//! The two channels are drawn one after the other from the same generator,
//! so they are statistically independent (decorrelated left/right hiss).

use rand::Rng;
use rand_distr::StandardNormal;
use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};

use crate::error::{ResonanceError, Result, require_non_negative};

use super::wave::StereoWave;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseSpec {
    /// Spectral exponent β. 0 is white, 1 pink, 2 brown.
    pub beta: f64,
    /// Target RMS amplitude of each channel, at most full scale (1.0).
    pub level: f64,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        NoiseSpec {
            beta: 1.0,
            level: 0.003,
        }
    }
}

impl NoiseSpec {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("noise_beta", self.beta)?;
        require_non_negative("noise_level", self.level)?;
        if self.level > 1.0 {
            return Err(ResonanceError::invalid(
                "noise_level",
                self.level,
                "must not exceed full scale (1.0)",
            ));
        }
        Ok(())
    }
}

/// Root-mean-square of a buffer (0 for an empty one).
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}

/// One channel of `len` samples of 1/f^β noise at RMS `level`.
pub fn colored_noise<R: Rng>(rng: &mut R, len: usize, spec: &NoiseSpec) -> Vec<f64> {
    if len == 0 || spec.level == 0.0 {
        return vec![0.0; len];
    }

    let mut spectrum: Vec<Complex<f64>> = (0..len)
        .map(|_| {
            let re: f64 = rng.sample(StandardNormal);
            Complex::new(re, 0.0)
        })
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(len).process(&mut spectrum);

    let exponent = -spec.beta / 2.0;
    spectrum[0] = Complex::new(0.0, 0.0);
    for (k, bin) in spectrum.iter_mut().enumerate().skip(1) {
        // Bins k and len - k hold the same physical frequency.
        let f = k.min(len - k) as f64;
        *bin *= f.powf(exponent);
    }

    planner.plan_fft_inverse(len).process(&mut spectrum);

    let shaped: Vec<f64> = spectrum.iter().map(|c| c.re).collect();
    let current = rms(&shaped);
    if current == 0.0 || !current.is_finite() {
        return vec![0.0; len];
    }
    let gain = spec.level / current;
    shaped.into_iter().map(|s| s * gain).collect()
}

/// Independent left and right noise channels.
pub fn noise_pair<R: Rng>(rng: &mut R, len: usize, spec: &NoiseSpec) -> Result<StereoWave> {
    spec.validate()?;
    let left = colored_noise(rng, len, spec);
    let right = colored_noise(rng, len, spec);
    StereoWave::new(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::analysis::spectral_slope;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rejects_negative_level_and_beta() {
        assert!(NoiseSpec { beta: 1.0, level: -0.01 }.validate().is_err());
        assert!(NoiseSpec { beta: -1.0, level: 0.01 }.validate().is_err());
        assert!(NoiseSpec { beta: f64::NAN, level: 0.01 }.validate().is_err());
        assert!(NoiseSpec { beta: 0.0, level: 0.0 }.validate().is_ok());
    }

    #[test]
    fn rejects_level_above_full_scale() {
        assert!(NoiseSpec { beta: 1.0, level: 1e308 }.validate().is_err());
        assert!(NoiseSpec { beta: 1.0, level: 1.0001 }.validate().is_err());
        assert!(NoiseSpec { beta: 1.0, level: 1.0 }.validate().is_ok());
        let mut rng = StdRng::seed_from_u64(3);
        assert!(noise_pair(&mut rng, 64, &NoiseSpec { beta: 1.0, level: 1e308 }).is_err());
    }

    #[test]
    fn hits_target_rms() {
        let mut rng = StdRng::seed_from_u64(11);
        let spec = NoiseSpec { beta: 1.1, level: 0.003 };
        let n = colored_noise(&mut rng, 10_000, &spec);
        assert!((rms(&n) - 0.003).abs() < 1e-9);
        assert!(n.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn zero_level_is_silent() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = colored_noise(&mut rng, 512, &NoiseSpec { beta: 1.0, level: 0.0 });
        assert!(n.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn single_sample_is_silent() {
        // Only the DC bin exists, and it is removed.
        let mut rng = StdRng::seed_from_u64(11);
        let n = colored_noise(&mut rng, 1, &NoiseSpec::default());
        assert_eq!(n, vec![0.0]);
    }

    #[test]
    fn has_no_dc_offset() {
        let mut rng = StdRng::seed_from_u64(5);
        let n = colored_noise(&mut rng, 4096, &NoiseSpec { beta: 2.0, level: 0.01 });
        let mean = n.iter().sum::<f64>() / n.len() as f64;
        assert!(mean.abs() < 1e-12, "mean {mean}");
    }

    #[test]
    fn channels_are_independent() {
        let mut rng = StdRng::seed_from_u64(9);
        let pair = noise_pair(&mut rng, 2048, &NoiseSpec::default()).unwrap();
        assert_ne!(pair.left(), pair.right());
    }

    #[test]
    fn psd_slope_tracks_beta() {
        let mut rng = StdRng::seed_from_u64(2024);
        for beta in [0.5, 1.0, 1.5, 2.0] {
            let n = colored_noise(&mut rng, 1 << 15, &NoiseSpec { beta, level: 0.005 });
            let slope = spectral_slope(&n);
            assert!(
                (slope + beta).abs() < 0.15,
                "beta {beta}: fitted slope {slope}"
            );
        }
    }
}
