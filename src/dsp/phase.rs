//! Phase Randomizer — per-engine random phase offsets keyed by role.
//!
//! Each role is drawn once, on first request, and held for the life of the
//! set. Stages of the same engine therefore stay phase-coherent, while two
//! engines (two sets) never share a draw.

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The oscillator or modulator a phase offset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseRole {
    CarrierLeft,
    CarrierRight,
    /// Oscillation phase of harmonic layer `i` (1-based).
    Harmonic(usize),
    /// Pan-orbit phase of harmonic layer `i` (1-based).
    Orbit(usize),
    Heartbeat,
    Breath,
}

#[derive(Debug, Clone)]
pub struct PhaseSet {
    rng: StdRng,
    drawn: HashMap<PhaseRole, f64>,
}

impl PhaseSet {
    /// Seeded from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Deterministic set for tests and reproducible renders.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: StdRng) -> Self {
        PhaseSet {
            rng,
            drawn: HashMap::new(),
        }
    }

    /// Phase in [0, 2π) for `role`, drawing it on first use.
    pub fn phase(&mut self, role: PhaseRole) -> f64 {
        *self
            .drawn
            .entry(role)
            .or_insert_with(|| self.rng.random_range(0.0..TAU))
    }

    /// Number of roles drawn so far.
    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }
}
