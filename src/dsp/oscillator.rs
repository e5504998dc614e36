//! Closed-form sine oscillators and the binaural carrier pair.
//!
//! Every sample is computed directly from its index, so no phase is carried
//! from one sample to the next.

use std::f64::consts::TAU;

use crate::error::{ResonanceError, Result, require_positive};

use super::wave::StereoWave;

/// A pure sinusoid `amplitude * sin(2π f t + phase)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    pub frequency: f64,
    pub phase: f64,
    pub amplitude: f64,
}

impl Oscillator {
    pub fn new(frequency: f64, phase: f64) -> Self {
        Oscillator {
            frequency,
            phase,
            amplitude: 1.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Value at time `t` seconds.
    pub fn value_at(&self, t: f64) -> f64 {
        self.amplitude * (TAU * self.frequency * t + self.phase).sin()
    }

    /// Render `len` samples at `sample_rate`, starting at t = 0.
    pub fn render(&self, len: usize, sample_rate: f64) -> Vec<f64> {
        (0..len)
            .map(|n| self.value_at(n as f64 / sample_rate))
            .collect()
    }
}

/// Reject a tone frequency that is not positive or would alias.
pub(crate) fn check_tone(name: &'static str, freq: f64, sample_rate: f64) -> Result<f64> {
    require_positive(name, freq)?;
    if freq >= sample_rate / 2.0 {
        return Err(ResonanceError::invalid(name, freq, "must be below Nyquist"));
    }
    Ok(freq)
}

/// Two independent carriers: `left` only ever reaches the left channel and
/// `right` only the right, so the beat exists only in the listener.
pub fn carrier_pair(
    left: Oscillator,
    right: Oscillator,
    len: usize,
    sample_rate: f64,
) -> Result<StereoWave> {
    StereoWave::new(left.render(len, sample_rate), right.render(len, sample_rate))
}
