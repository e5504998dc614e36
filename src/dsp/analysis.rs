//! Spectral analysis — dominant frequency, peak lists, and PSD slope.
//!
//! Used to verify rendered output: the binaural beat of a file, the overtone
//! peaks of the harmonic stack, and the 1/f^β slope of the noise floor.

use std::f64::consts::PI;

use rustfft::{FftPlanner, num_complex::Complex};

/// Hann window coefficient for `index` in a window of `size` samples.
pub fn hann_window(index: usize, size: usize) -> f64 {
    if size < 2 {
        return 1.0;
    }
    0.5 * (1.0 - ((2.0 * PI * index as f64) / (size as f64 - 1.0)).cos())
}

fn forward(samples: &[f64], windowed: bool) -> Vec<Complex<f64>> {
    let n = samples.len();
    let mut buf: Vec<Complex<f64>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = if windowed { hann_window(i, n) } else { 1.0 };
            Complex::new(s * w, 0.0)
        })
        .collect();
    if n > 0 {
        FftPlanner::<f64>::new().plan_fft_forward(n).process(&mut buf);
    }
    buf
}

/// Hann-windowed magnitude spectrum, bins `0..=n/2`.
pub fn magnitude_spectrum(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }
    forward(samples, true)[..=n / 2].iter().map(|c| c.norm()).collect()
}

/// Sub-bin peak position by fitting a parabola through three magnitudes.
fn interpolate(mags: &[f64], k: usize) -> f64 {
    if k == 0 || k + 1 >= mags.len() {
        return k as f64;
    }
    let (a, b, c) = (mags[k - 1], mags[k], mags[k + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() > 1e-12 {
        k as f64 + 0.5 * (a - c) / denom
    } else {
        k as f64
    }
}

/// Frequency in Hz of the strongest non-DC component.
pub fn dominant_frequency(samples: &[f64], sample_rate: u32) -> f64 {
    let mags = magnitude_spectrum(samples);
    if mags.len() < 2 {
        return 0.0;
    }
    let (k, _) = mags
        .iter()
        .enumerate()
        .skip(1)
        .fold((1, f64::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
    let bin_hz = sample_rate as f64 / samples.len() as f64;
    interpolate(&mags, k) * bin_hz
}

/// Frequencies (Hz, ascending) of local spectral maxima whose magnitude is at
/// least `threshold` times the strongest one.
pub fn spectral_peaks(samples: &[f64], sample_rate: u32, threshold: f64) -> Vec<f64> {
    let mags = magnitude_spectrum(samples);
    if mags.len() < 3 {
        return Vec::new();
    }
    let max = mags.iter().skip(1).cloned().fold(0.0_f64, f64::max);
    if max == 0.0 {
        return Vec::new();
    }
    let bin_hz = sample_rate as f64 / samples.len() as f64;
    (1..mags.len() - 1)
        .filter(|&k| mags[k] > mags[k - 1] && mags[k] >= mags[k + 1] && mags[k] >= threshold * max)
        .map(|k| interpolate(&mags, k) * bin_hz)
        .collect()
}

/// Least-squares slope of log power against log bin index over bins
/// `1..n/2`. White noise gives ≈ 0, pink ≈ -1, brown ≈ -2.
pub fn spectral_slope(samples: &[f64]) -> f64 {
    let n = samples.len();
    let spectrum = forward(samples, false);
    let points: Vec<(f64, f64)> = (1..n / 2)
        .filter_map(|k| {
            let power = spectrum[k].norm_sqr();
            (power > 0.0).then(|| ((k as f64).ln(), power.ln()))
        })
        .collect();
    if points.len() < 2 {
        return 0.0;
    }
    let count = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / count;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / count;
    let (cov, var) = points.iter().fold((0.0, 0.0), |(c, v), &(x, y)| {
        (c + (x - mean_x) * (y - mean_y), v + (x - mean_x) * (x - mean_x))
    });
    if var == 0.0 { 0.0 } else { cov / var }
}
