//! Breath envelope — half-cosine fade-in and fade-out over the whole mix.

use std::f64::consts::PI;

use crate::error::{ResonanceError, Result, require_non_negative};

use super::wave::StereoWave;

/// Fade-in/fade-out applied once per render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathEnvelope {
    /// Ramp length in samples at each end.
    fade: usize,
    len: usize,
}

impl BreathEnvelope {
    /// Envelope for a buffer of `len` samples. A fade longer than half the
    /// buffer is rejected rather than clamped, so ramps can never overlap.
    pub fn new(fade_seconds: f64, sample_rate: f64, len: usize) -> Result<Self> {
        require_non_negative("fade_seconds", fade_seconds)?;
        // Half a sample of slack absorbs rounding of the buffer length.
        if fade_seconds * sample_rate > len as f64 / 2.0 + 0.5 {
            return Err(ResonanceError::invalid(
                "fade_seconds",
                fade_seconds,
                "must not exceed half the duration",
            ));
        }
        // At least one sample so both ends land on exactly zero.
        let fade = ((fade_seconds * sample_rate).round() as usize)
            .max(1)
            .min(len / 2);
        Ok(BreathEnvelope { fade, len })
    }

    pub fn fade_samples(&self) -> usize {
        self.fade
    }

    /// Gain for sample `n`.
    pub fn gain_at(&self, n: usize) -> f64 {
        if self.fade == 0 {
            // Buffers shorter than two samples are all edge.
            return 0.0;
        }
        let from_edge = n.min(self.len.saturating_sub(1).saturating_sub(n));
        if from_edge >= self.fade {
            return 1.0;
        }
        0.5 * (1.0 - (PI * from_edge as f64 / self.fade as f64).cos())
    }

    pub fn gains(&self) -> Vec<f64> {
        (0..self.len).map(|n| self.gain_at(n)).collect()
    }

    pub fn apply(&self, wave: &StereoWave) -> Result<StereoWave> {
        wave.modulate(&self.gains())
    }
}
