//! Presets — named parameter bundles that drive one full render.
//!
//! A preset fixes the carrier pair, harmonic stack, noise color, HRV pulse,
//! fade length and default duration. Built-in presets cover the classic
//! brainwave bands; custom ones load from JSON with the same schema:
//!
//! ```json
//! {
//!   "name": "true-theta",
//!   "description": "4 Hz theta beat",
//!   "durationSeconds": 60.0,
//!   "leftFreq": 432.0,
//!   "rightFreq": 436.0,
//!   "harmonicBase": 432.0,
//!   "layers": 3,
//!   "noise": { "beta": 1.1, "level": 0.003 },
//!   "hrv": { "baseRate": 1.2, "drift": 0.2, "breathRate": 0.1, "floor": 0.1 },
//!   "fadeSeconds": 2.0
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dsp::{HrvSpec, NoiseSpec, PcmBuffer, RenderSpec, ResonanceEngine, StereoWave};
use crate::error::{ResonanceError, Result, require_non_negative, require_positive};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration_seconds: f64,
    pub left_freq: f64,
    pub right_freq: f64,
    pub harmonic_base: f64,
    pub layers: usize,
    pub noise: NoiseSpec,
    pub hrv: HrvSpec,
    pub fade_seconds: f64,
}

/// Per-run overrides applied on top of a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub sample_rate: u32,
    /// Replaces the preset's own duration when set.
    pub duration: Option<f64>,
    /// Pins the phase set; `None` draws fresh phases from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration: None,
            seed: None,
        }
    }
}

impl Preset {
    /// The built-in presets.
    pub fn builtin() -> Vec<Preset> {
        vec![
            Preset {
                name: "true-theta".into(),
                description: "4 Hz theta beat for deep meditation".into(),
                duration_seconds: 60.0,
                left_freq: 432.0,
                right_freq: 436.0,
                harmonic_base: 432.0,
                layers: 3,
                noise: NoiseSpec { beta: 1.1, level: 0.003 },
                hrv: HrvSpec { base_rate: 1.2, drift: 0.2, breath_rate: 0.1, floor: 0.1 },
                fade_seconds: 2.0,
            },
            Preset {
                name: "deep-sleep".into(),
                description: "2 Hz delta beat, slow pulse, warm noise".into(),
                duration_seconds: 300.0,
                left_freq: 432.0,
                right_freq: 434.0,
                harmonic_base: 432.0,
                layers: 2,
                noise: NoiseSpec { beta: 1.6, level: 0.005 },
                hrv: HrvSpec { base_rate: 0.9, drift: 0.15, breath_rate: 0.07, floor: 0.2 },
                fade_seconds: 10.0,
            },
            Preset {
                name: "focus".into(),
                description: "10 Hz alpha beat with a gentle pulse".into(),
                duration_seconds: 120.0,
                left_freq: 432.0,
                right_freq: 442.0,
                harmonic_base: 432.0,
                layers: 4,
                noise: NoiseSpec { beta: 0.8, level: 0.002 },
                hrv: HrvSpec { base_rate: 1.0, drift: 0.1, breath_rate: 0.12, floor: 0.6 },
                fade_seconds: 4.0,
            },
            Preset {
                name: "gamma-flow".into(),
                description: "40 Hz gamma beat for alert flow states".into(),
                duration_seconds: 90.0,
                left_freq: 432.0,
                right_freq: 472.0,
                harmonic_base: 432.0,
                layers: 5,
                noise: NoiseSpec { beta: 0.7, level: 0.002 },
                hrv: HrvSpec { base_rate: 1.3, drift: 0.2, breath_rate: 0.15, floor: 0.5 },
                fade_seconds: 3.0,
            },
        ]
    }

    /// Look up a built-in preset by name (case-insensitive).
    pub fn find(name: &str) -> Result<Preset> {
        Self::builtin()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ResonanceError::UnknownPreset(name.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Preset> {
        let preset: Preset = serde_json::from_str(json)?;
        preset.validate()?;
        Ok(preset)
    }

    pub fn from_json_file(path: &Path) -> Result<Preset> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Binaural beat frequency in Hz.
    pub fn beat_hz(&self) -> f64 {
        (self.right_freq - self.left_freq).abs()
    }

    /// Check everything that does not depend on the sample rate.
    pub fn validate(&self) -> Result<()> {
        require_positive("duration", self.duration_seconds)?;
        require_positive("freq_left", self.left_freq)?;
        require_positive("freq_right", self.right_freq)?;
        require_positive("base_freq", self.harmonic_base)?;
        if self.layers < 1 {
            return Err(ResonanceError::invalid("layers", self.layers as f64, "must be >= 1"));
        }
        self.noise.validate()?;
        self.hrv.validate()?;
        require_non_negative("fade_seconds", self.fade_seconds)?;
        if self.fade_seconds > self.duration_seconds / 2.0 {
            return Err(ResonanceError::invalid(
                "fade_seconds",
                self.fade_seconds,
                "must not exceed half the duration",
            ));
        }
        Ok(())
    }

    fn engine(&self, options: &RenderOptions) -> Result<ResonanceEngine> {
        let duration = options.duration.unwrap_or(self.duration_seconds);
        match options.seed {
            Some(seed) => ResonanceEngine::with_seed(options.sample_rate, duration, seed),
            None => ResonanceEngine::new(options.sample_rate, duration),
        }
    }

    /// Render spec for `duration` seconds. The fade is shortened to half the
    /// duration when a duration override would otherwise make it too long.
    pub fn render_spec(&self, duration: f64, output: impl Into<PathBuf>) -> RenderSpec {
        let fade_seconds = self.fade_seconds.min(duration / 2.0);
        if fade_seconds < self.fade_seconds {
            debug!(preset = %self.name, fade_seconds, "shortened fade to fit duration");
        }
        RenderSpec {
            fade_seconds,
            output: output.into(),
            noise: self.noise,
            hrv: self.hrv,
        }
    }

    fn synthesize(&self, options: &RenderOptions, output: PathBuf) -> Result<(ResonanceEngine, Prepared)> {
        self.validate()?;
        let mut engine = self.engine(options)?;
        let spec = self.render_spec(engine.config().duration(), output);
        info!(
            preset = %self.name,
            beat_hz = self.beat_hz(),
            seconds = engine.config().duration(),
            sample_rate = options.sample_rate,
            "rendering preset"
        );
        let wave = engine.carriers(self.left_freq, self.right_freq)?;
        let wave = engine.add_harmonics(wave, self.harmonic_base, self.layers)?;
        Ok((engine, Prepared { wave, spec }))
    }

    /// Render to PCM in memory.
    pub fn mixdown(&self, options: &RenderOptions) -> Result<PcmBuffer> {
        let (mut engine, input) = self.synthesize(options, PathBuf::new())?;
        engine.mixdown(input.wave, &input.spec)
    }

    /// Render and write a WAV file to `output`.
    pub fn render(&self, options: &RenderOptions, output: &Path) -> Result<PcmBuffer> {
        let (mut engine, input) = self.synthesize(options, output.to_path_buf())?;
        engine.render(input.wave, &input.spec)
    }
}

struct Prepared {
    wave: StereoWave,
    spec: RenderSpec,
}
