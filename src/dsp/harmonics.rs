//! Golden-ratio harmonic stack with per-layer orbital panning.
//!
//! Layer `i` sits at `base * Φ^i` with amplitude `Φ^-i`. Because Φ is
//! irrational no layer lands on an integer multiple of another, and the
//! amplitudes form a geometric series bounded by Φ for any layer count.
//!
//! Each layer drifts between the ears on its own slow orbit. Orbit rates
//! shrink by Φ per layer so the orbits never lock to each other.

use std::f64::consts::FRAC_PI_4;

use tracing::debug;

use crate::error::Result;

use super::oscillator::Oscillator;
use super::phase::{PhaseRole, PhaseSet};
use super::wave::StereoWave;

/// The golden ratio Φ = (1 + √5) / 2.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Orbit rate of the first layer in Hz (one full left-right sweep per 10 s).
pub const ORBIT_BASE_HZ: f64 = 0.1;

// Exponents go through f64 so no layer index can wrap or overflow.

pub fn layer_frequency(base_freq: f64, index: usize) -> f64 {
    base_freq * PHI.powf(index as f64)
}

pub fn layer_amplitude(index: usize) -> f64 {
    PHI.powf(-(index as f64))
}

pub fn orbit_rate(index: usize) -> f64 {
    ORBIT_BASE_HZ * PHI.powf(1.0 - index as f64)
}

/// One overtone plus the slow pan orbit that carries it between channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicLayer {
    pub index: usize,
    pub tone: Oscillator,
    pub orbit: Oscillator,
}

impl HarmonicLayer {
    pub fn new(base_freq: f64, index: usize, phase: f64, orbit_phase: f64) -> Self {
        HarmonicLayer {
            index,
            tone: Oscillator::new(layer_frequency(base_freq, index), phase)
                .with_amplitude(layer_amplitude(index)),
            orbit: Oscillator::new(orbit_rate(index), orbit_phase),
        }
    }

    /// Equal-power (left, right) gains at time `t`. `gl² + gr² = 1` always.
    pub fn pan_gains(&self, t: f64) -> (f64, f64) {
        let position = self.orbit.value_at(t);
        let angle = (position + 1.0) * FRAC_PI_4;
        (angle.cos(), angle.sin())
    }
}

/// Build layers `1..=layers`, drawing each layer's tone and orbit phase from
/// `phases`. Frequencies rise with the index, so the stack stops at the first
/// layer at or above Nyquist.
pub fn golden_layers(
    base_freq: f64,
    layers: usize,
    sample_rate: f64,
    phases: &mut PhaseSet,
) -> Vec<HarmonicLayer> {
    let nyquist = sample_rate / 2.0;
    let audible: Vec<HarmonicLayer> = (1..=layers)
        .take_while(|&i| layer_frequency(base_freq, i) < nyquist)
        .map(|i| {
            let phase = phases.phase(PhaseRole::Harmonic(i));
            let orbit_phase = phases.phase(PhaseRole::Orbit(i));
            HarmonicLayer::new(base_freq, i, phase, orbit_phase)
        })
        .collect();
    if audible.len() < layers {
        debug!(
            requested = layers,
            audible = audible.len(),
            nyquist,
            "dropping harmonic layers above Nyquist"
        );
    }
    audible
}

/// Add the panned layers on top of `wave`, returning a new wave.
pub fn stack(wave: &StereoWave, layers: &[HarmonicLayer], sample_rate: f64) -> Result<StereoWave> {
    let len = wave.len();
    let mut left = wave.left().to_vec();
    let mut right = wave.right().to_vec();
    for n in 0..len {
        let t = n as f64 / sample_rate;
        for layer in layers {
            let s = layer.tone.value_at(t);
            let (gl, gr) = layer.pan_gains(t);
            left[n] += gl * s;
            right[n] += gr * s;
        }
    }
    StereoWave::new(left, right)
}

/// Upper bound on the summed amplitude of any number of layers.
pub fn amplitude_bound() -> f64 {
    // Σ_{i≥1} Φ^-i = 1 / (Φ - 1) = Φ
    1.0 / (PHI - 1.0)
}
