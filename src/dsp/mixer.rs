//! Mixer — peak normalization and 16-bit quantization.

use serde::{Deserialize, Serialize};

use super::wave::StereoWave;

/// Interleaved 16-bit stereo PCM (L, R, L, R, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcmBuffer {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl PcmBuffer {
    pub const CHANNELS: u16 = 2;

    /// Number of stereo frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / Self::CHANNELS as usize
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn left(&self) -> impl Iterator<Item = i16> + '_ {
        self.samples.iter().step_by(2).copied()
    }

    pub fn right(&self) -> impl Iterator<Item = i16> + '_ {
        self.samples.iter().skip(1).step_by(2).copied()
    }
}

/// Scale so the loudest sample across both channels sits exactly at `target`.
/// A silent wave is returned unchanged.
pub fn normalize_peak(wave: &StereoWave, target: f64) -> StereoWave {
    let peak = wave.peak();
    if peak == 0.0 {
        return wave.clone();
    }
    wave.scale(target / peak)
}

/// Convert one sample in [-1, 1] to i16.
pub fn quantize_sample(s: f64) -> i16 {
    (s * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Interleave and quantize a normalized wave.
pub fn quantize(wave: &StereoWave, sample_rate: u32) -> PcmBuffer {
    let mut samples = Vec::with_capacity(wave.len() * 2);
    for (&l, &r) in wave.left().iter().zip(wave.right()) {
        samples.push(quantize_sample(l));
        samples.push(quantize_sample(r));
    }
    PcmBuffer { sample_rate, samples }
}
