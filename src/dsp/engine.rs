//! Resonance Engine — owns the configuration and randomness of one render.
//!
//! An engine holds an [`EngineConfig`], a [`PhaseSet`], and a noise generator,
//! all split from a single master RNG at construction. Stages are called in
//! sequence by the preset layer:
//!
//! ```text
//! carriers → add_harmonics → render (HRV × tonal + noise → fade → normalize → WAV)
//! ```
//!
//! Engines share nothing, so independent renders can run on separate threads.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::error::{ResonanceError, Result, require_positive};

use super::harmonics;
use super::noise::{self, NoiseSpec};
use super::oscillator::{self, Oscillator};
use super::phase::{PhaseRole, PhaseSet};
use super::pulse::{HeartbeatPulse, HrvSpec};
use super::renderer::{self, RenderSpec};
use super::mixer::PcmBuffer;
use super::wave::StereoWave;

/// Longest buffer an engine will allocate. The largest per-sample element is
/// the complex f64 noise spectrum.
pub const MAX_SAMPLES: usize = isize::MAX as usize / (2 * std::mem::size_of::<f64>());

/// Sample rate and duration of every buffer an engine produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    sample_rate: u32,
    duration: f64,
    num_samples: usize,
}

impl EngineConfig {
    pub fn new(sample_rate: u32, duration: f64) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ResonanceError::invalid("sample_rate", 0.0, "must be > 0"));
        }
        require_positive("duration", duration)?;
        let num_samples = (sample_rate as f64 * duration).round();
        if num_samples < 1.0 {
            return Err(ResonanceError::invalid(
                "duration",
                duration,
                "shorter than one sample",
            ));
        }
        if num_samples > MAX_SAMPLES as f64 {
            return Err(ResonanceError::invalid(
                "duration",
                duration,
                "too many samples to allocate",
            ));
        }
        Ok(EngineConfig {
            sample_rate,
            duration,
            num_samples: num_samples as usize,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// `round(sample_rate × duration)`.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub(crate) fn rate(&self) -> f64 {
        self.sample_rate as f64
    }
}

pub struct ResonanceEngine {
    config: EngineConfig,
    phases: PhaseSet,
    noise_rng: StdRng,
}

impl ResonanceEngine {
    /// Engine seeded from OS entropy: every instance draws fresh phases.
    pub fn new(sample_rate: u32, duration: f64) -> Result<Self> {
        Ok(Self::from_rng(
            EngineConfig::new(sample_rate, duration)?,
            StdRng::from_os_rng(),
        ))
    }

    /// Reproducible engine for tests and pinned renders.
    pub fn with_seed(sample_rate: u32, duration: f64, seed: u64) -> Result<Self> {
        Ok(Self::from_rng(
            EngineConfig::new(sample_rate, duration)?,
            StdRng::seed_from_u64(seed),
        ))
    }

    pub fn from_rng(config: EngineConfig, mut master: StdRng) -> Self {
        let phases = PhaseSet::from_rng(StdRng::from_rng(&mut master));
        let noise_rng = StdRng::from_rng(&mut master);
        ResonanceEngine {
            config,
            phases,
            noise_rng,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Left channel is a pure tone at `freq_left`, right at `freq_right`,
    /// each starting at its own random phase.
    pub fn carriers(&mut self, freq_left: f64, freq_right: f64) -> Result<StereoWave> {
        let sr = self.config.rate();
        oscillator::check_tone("freq_left", freq_left, sr)?;
        oscillator::check_tone("freq_right", freq_right, sr)?;

        let left = Oscillator::new(freq_left, self.phases.phase(PhaseRole::CarrierLeft));
        let right = Oscillator::new(freq_right, self.phases.phase(PhaseRole::CarrierRight));
        debug!(freq_left, freq_right, beat_hz = (freq_right - freq_left).abs(), "carriers");
        oscillator::carrier_pair(left, right, self.config.num_samples(), sr)
    }

    /// Add `layers` golden-ratio overtones of `base_freq`, each on its own pan orbit.
    pub fn add_harmonics(&mut self, wave: StereoWave, base_freq: f64, layers: usize) -> Result<StereoWave> {
        let sr = self.config.rate();
        if layers < 1 {
            return Err(ResonanceError::invalid("layers", layers as f64, "must be >= 1"));
        }
        oscillator::check_tone("base_freq", base_freq, sr)?;
        wave.require_len(self.config.num_samples())?;

        let stack = harmonics::golden_layers(base_freq, layers, sr, &mut self.phases);
        debug!(base_freq, requested = layers, audible = stack.len(), "harmonic stack");
        harmonics::stack(&wave, &stack, sr)
    }

    /// The HRV amplitude envelope, one value per sample.
    pub fn hrv_envelope(&mut self, spec: &HrvSpec) -> Result<Vec<f64>> {
        spec.validate()?;
        let pulse = HeartbeatPulse::new(
            *spec,
            self.phases.phase(PhaseRole::Heartbeat),
            self.phases.phase(PhaseRole::Breath),
        )?;
        Ok(pulse.render(self.config.num_samples(), self.config.rate()))
    }

    /// Independent left/right colored noise at the configured length.
    pub fn noise_floor(&mut self, spec: &NoiseSpec) -> Result<StereoWave> {
        noise::noise_pair(&mut self.noise_rng, self.config.num_samples(), spec)
    }

    /// Run the full mixdown without writing anything.
    pub fn mixdown(&mut self, wave: StereoWave, spec: &RenderSpec) -> Result<PcmBuffer> {
        renderer::mixdown(self, wave, spec)
    }

    /// Mix down and write the WAV file named by `spec.output`.
    pub fn render(&mut self, wave: StereoWave, spec: &RenderSpec) -> Result<PcmBuffer> {
        let pcm = self.mixdown(wave, spec)?;
        renderer::write_wav(&spec.output, &pcm)?;
        Ok(pcm)
    }
}
