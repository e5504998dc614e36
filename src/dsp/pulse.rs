//! Pulse Modulator — heart-rate-variability amplitude envelope.
//!
//! The heartbeat rate is itself modulated by a slower breathing oscillator:
//!
//! ```text
//! rate(t)  = base + drift · sin(2π·breath·t + φb)
//! θ(t)     = φh + 2π·base·t + (drift / breath) · (cos φb − cos(2π·breath·t + φb))
//! ```
//!
//! `θ` is the exact integral of `2π·rate`, so the envelope stays a closed-form
//! function of time. The raw pulse `½(1 + sin θ)` passes through a smoothstep
//! knee and is lifted onto `[floor, 1]`, so it never reaches zero.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ResonanceError, Result, require_non_negative, require_positive};

/// Lowest instantaneous heartbeat rate the envelope will produce, in Hz.
pub const MIN_PULSE_RATE_HZ: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrvSpec {
    /// Resting pulse rate in Hz (0.5–2.0 is typical).
    pub base_rate: f64,
    /// Peak deviation of the rate in Hz.
    pub drift: f64,
    /// Rate of the breathing oscillator that drives the drift, in Hz.
    pub breath_rate: f64,
    /// Lowest envelope value, as a fraction of full amplitude. Must be in (0, 1).
    pub floor: f64,
}

impl Default for HrvSpec {
    fn default() -> Self {
        HrvSpec {
            base_rate: 1.2,
            drift: 0.2,
            breath_rate: 0.1,
            floor: 0.1,
        }
    }
}

impl HrvSpec {
    pub fn validate(&self) -> Result<()> {
        require_positive("hrv_base_rate", self.base_rate)?;
        require_non_negative("hrv_drift", self.drift)?;
        require_positive("hrv_breath", self.breath_rate)?;
        if self.breath_rate < f64::MIN_POSITIVE {
            return Err(ResonanceError::invalid(
                "hrv_breath",
                self.breath_rate,
                "must be a normal positive number",
            ));
        }
        if !self.floor.is_finite() || self.floor <= 0.0 || self.floor >= 1.0 {
            return Err(ResonanceError::invalid(
                "soft_knee_floor",
                self.floor,
                "must be in (0, 1)",
            ));
        }
        Ok(())
    }

    /// Drift actually applied: limited so `base - drift >= MIN_PULSE_RATE_HZ`
    /// (or to zero when the base rate is already below that minimum).
    pub fn effective_drift(&self) -> f64 {
        let limit = (self.base_rate - MIN_PULSE_RATE_HZ).max(0.0);
        self.drift.min(limit)
    }
}

/// A validated HRV envelope with its phases fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartbeatPulse {
    spec: HrvSpec,
    drift: f64,
    heartbeat_phase: f64,
    breath_phase: f64,
}

impl HeartbeatPulse {
    pub fn new(spec: HrvSpec, heartbeat_phase: f64, breath_phase: f64) -> Result<Self> {
        spec.validate()?;
        let drift = spec.effective_drift();
        if drift < spec.drift {
            warn!(
                base_rate = spec.base_rate,
                requested = spec.drift,
                applied = drift,
                "HRV drift would push the pulse rate below {MIN_PULSE_RATE_HZ} Hz; clamping"
            );
        }
        Ok(HeartbeatPulse {
            spec,
            drift,
            heartbeat_phase,
            breath_phase,
        })
    }

    /// Instantaneous pulse rate in Hz at time `t`.
    pub fn rate_at(&self, t: f64) -> f64 {
        self.spec.base_rate + self.drift * (TAU * self.spec.breath_rate * t + self.breath_phase).sin()
    }

    /// Accumulated heartbeat phase at time `t`.
    pub fn phase_at(&self, t: f64) -> f64 {
        // (d/b)(cos φ − cos(2πbt + φ)) rewritten as 2d·πt·sinc(πbt)·sin(φ + πbt)
        // so a tiny breath rate never divides down to infinity.
        let x = PI * self.spec.breath_rate * t;
        let sinc = if x == 0.0 { 1.0 } else { x.sin() / x };
        let swing = 2.0 * self.drift * PI * t * sinc * (self.breath_phase + x).sin();
        self.heartbeat_phase + TAU * self.spec.base_rate * t + swing
    }

    /// Envelope value at time `t`, always within `[floor, 1]`.
    pub fn value_at(&self, t: f64) -> f64 {
        let raw = 0.5 * (1.0 + self.phase_at(t).sin());
        let floor = self.spec.floor;
        floor + (1.0 - floor) * soft_knee(raw)
    }

    pub fn render(&self, len: usize, sample_rate: f64) -> Vec<f64> {
        (0..len)
            .map(|n| self.value_at(n as f64 / sample_rate))
            .collect()
    }
}

/// Smoothstep knee: maps [0, 1] onto [0, 1] with zero slope at both ends,
/// rounding off the bottom of each beat instead of cutting it.
pub fn soft_knee(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_max(v: &[f64]) -> (f64, f64) {
        v.iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &x| (lo.min(x), hi.max(x)))
    }

    #[test]
    fn rejects_floor_out_of_range() {
        for floor in [0.0, -0.2, 1.0, 1.5, f64::NAN] {
            let spec = HrvSpec { floor, ..HrvSpec::default() };
            assert!(spec.validate().is_err(), "floor {floor} should be rejected");
        }
    }

    #[test]
    fn rejects_non_positive_rates() {
        let spec = HrvSpec { base_rate: 0.0, ..HrvSpec::default() };
        assert!(spec.validate().is_err());
        let spec = HrvSpec { breath_rate: -0.1, ..HrvSpec::default() };
        assert!(spec.validate().is_err());
        let spec = HrvSpec { drift: -0.1, ..HrvSpec::default() };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn knee_endpoints() {
        assert_eq!(soft_knee(0.0), 0.0);
        assert_eq!(soft_knee(1.0), 1.0);
        assert!((soft_knee(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn envelope_respects_floor() {
        let spec = HrvSpec::default();
        let pulse = HeartbeatPulse::new(spec, 0.7, 2.1).unwrap();
        let env = pulse.render(8000 * 20, 8000.0);
        let (lo, hi) = min_max(&env);
        assert!(lo >= spec.floor * hi - 1e-12, "min {lo} below floor × peak");
        assert!(lo > 0.0);
        assert!(hi <= 1.0 + 1e-12);
    }

    #[test]
    fn excessive_drift_is_clamped() {
        let spec = HrvSpec {
            base_rate: 0.8,
            drift: 1.5,
            breath_rate: 0.1,
            floor: 0.05,
        };
        assert!((spec.effective_drift() - (0.8 - MIN_PULSE_RATE_HZ)).abs() < 1e-12);
        let pulse = HeartbeatPulse::new(spec, 0.0, 0.0).unwrap();
        for k in 0..2000 {
            let t = k as f64 * 0.01;
            assert!(pulse.rate_at(t) >= MIN_PULSE_RATE_HZ - 1e-12);
        }
        let env = pulse.render(4000 * 30, 4000.0);
        let (lo, _) = min_max(&env);
        assert!(lo >= spec.floor - 1e-12);
    }

    #[test]
    fn tiny_base_rate_disables_drift() {
        let spec = HrvSpec {
            base_rate: 0.01,
            drift: 0.3,
            breath_rate: 0.1,
            floor: 0.5,
        };
        assert_eq!(spec.effective_drift(), 0.0);
    }

    #[test]
    fn phase_derivative_matches_rate() {
        let pulse = HeartbeatPulse::new(HrvSpec::default(), 0.4, 1.3).unwrap();
        let h = 1e-6;
        for k in 0..50 {
            let t = k as f64 * 0.73;
            let numeric = (pulse.phase_at(t + h) - pulse.phase_at(t - h)) / (2.0 * h);
            let expected = TAU * pulse.rate_at(t);
            assert!(
                (numeric - expected).abs() < 1e-4,
                "dθ/dt = {numeric}, 2π·rate = {expected}"
            );
        }
    }

    #[test]
    fn subnormal_breath_rate_is_rejected() {
        let spec = HrvSpec { breath_rate: 1e-310, ..HrvSpec::default() };
        assert!(spec.validate().is_err());
        assert!(HeartbeatPulse::new(spec, 0.0, 0.0).is_err());
    }

    #[test]
    fn tiny_breath_rate_stays_finite() {
        let spec = HrvSpec { breath_rate: 1e-300, ..HrvSpec::default() };
        let pulse = HeartbeatPulse::new(spec, 0.3, 1.9).unwrap();
        let env = pulse.render(8000 * 5, 8000.0);
        assert!(env.iter().all(|v| v.is_finite()));
        let (lo, hi) = min_max(&env);
        assert!(lo >= spec.floor - 1e-12);
        assert!(hi <= 1.0 + 1e-12);
    }

    #[test]
    fn rate_drifts_across_breath_cycle() {
        let spec = HrvSpec::default();
        let pulse = HeartbeatPulse::new(spec, 0.0, 0.0).unwrap();
        let rates: Vec<f64> = (0..1000).map(|k| pulse.rate_at(k as f64 * 0.01)).collect();
        let (lo, hi) = min_max(&rates);
        assert!((hi - (spec.base_rate + spec.drift)).abs() < 1e-3);
        assert!((lo - (spec.base_rate - spec.drift)).abs() < 1e-3);
    }
}
