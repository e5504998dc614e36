//! Renderer — mixes the layers down to 16-bit stereo PCM and writes WAV.
//!
//! Order of operations:
//! 1. tonal wave × HRV envelope, peak-normalized to full scale
//! 2. + colored noise floor at its RMS level
//! 3. × breath envelope
//! 4. peak-normalized across both channels, quantized to i16
//!
//! This is the only place samples are normalized or clipped.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ResonanceError, Result};

use super::engine::ResonanceEngine;
use super::envelope::BreathEnvelope;
use super::mixer::{PcmBuffer, normalize_peak, quantize};
use super::noise::NoiseSpec;
use super::pulse::HrvSpec;
use super::wave::StereoWave;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSpec {
    /// Length of each breath ramp in seconds. At most half the duration.
    pub fade_seconds: f64,
    pub output: PathBuf,
    pub noise: NoiseSpec,
    pub hrv: HrvSpec,
}

impl RenderSpec {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        RenderSpec {
            fade_seconds: 2.0,
            output: output.into(),
            noise: NoiseSpec::default(),
            hrv: HrvSpec::default(),
        }
    }
}

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: PcmBuffer::CHANNELS,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn require_finite(wave: StereoWave) -> Result<StereoWave> {
    match wave.first_non_finite() {
        Some(index) => Err(ResonanceError::NonFinite { index }),
        None => Ok(wave),
    }
}

/// Full mixdown. Every parameter is checked before any buffer is built.
pub fn mixdown(engine: &mut ResonanceEngine, wave: StereoWave, spec: &RenderSpec) -> Result<PcmBuffer> {
    let config = *engine.config();
    spec.noise.validate()?;
    spec.hrv.validate()?;
    let breath = BreathEnvelope::new(spec.fade_seconds, config.rate(), config.num_samples())?;
    wave.require_len(config.num_samples())?;
    let wave = require_finite(wave)?;

    let pulse = engine.hrv_envelope(&spec.hrv)?;
    if let Some(index) = pulse.iter().position(|v| !v.is_finite()) {
        return Err(ResonanceError::NonFinite { index });
    }
    let tonal = require_finite(wave.modulate(&pulse)?)?;
    let tonal = normalize_peak(&tonal, 1.0);
    let floor = require_finite(engine.noise_floor(&spec.noise)?)?;
    let mix = require_finite(breath.apply(&tonal.add(&floor)?)?)?;
    let mix = normalize_peak(&mix, 1.0);
    let pcm = quantize(&mix, config.sample_rate());

    info!(
        frames = pcm.frames(),
        sample_rate = pcm.sample_rate,
        fade_samples = breath.fade_samples(),
        noise_beta = spec.noise.beta,
        noise_level = spec.noise.level,
        "mixdown complete"
    );
    Ok(pcm)
}

/// Write `pcm` as a 16-bit stereo WAV file.
pub fn write_wav(path: &Path, pcm: &PcmBuffer) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, wav_spec(pcm.sample_rate))?;
    for &s in &pcm.samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    info!(path = %path.display(), seconds = pcm.duration_seconds(), "wrote WAV");
    Ok(())
}

/// Encode `pcm` as WAV file bytes in memory.
pub fn encode_wav(pcm: &PcmBuffer) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(44 + pcm.samples.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, wav_spec(pcm.sample_rate))?;
        for &s in &pcm.samples {
            writer.write_sample(s)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Load a 16-bit WAV as f64 channels, using the same 32767 full scale as
/// [`quantize`]. Mono files are duplicated onto both channels.
pub fn read_wav(path: &Path) -> Result<(StereoWave, u32)> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(ResonanceError::invalid(
            "bits_per_sample",
            spec.bits_per_sample as f64,
            "only 16-bit integer PCM is supported",
        ));
    }
    let samples = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f64 / 32767.0))
        .collect::<std::result::Result<Vec<f64>, _>>()?;

    let wave = match spec.channels {
        1 => StereoWave::new(samples.clone(), samples)?,
        2 => {
            let left = samples.iter().step_by(2).copied().collect();
            let right = samples.iter().skip(1).step_by(2).copied().collect();
            StereoWave::new(left, right)?
        }
        n => {
            return Err(ResonanceError::invalid(
                "channels",
                n as f64,
                "only mono or stereo files are supported",
            ));
        }
    };
    Ok((wave, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_spec() -> RenderSpec {
        RenderSpec {
            fade_seconds: 1.0,
            output: PathBuf::from("unused.wav"),
            noise: NoiseSpec { beta: 1.0, level: 0.0 },
            hrv: HrvSpec {
                base_rate: 1.2,
                drift: 0.2,
                breath_rate: 0.1,
                floor: 0.999,
            },
        }
    }

    fn block_rms(samples: &[f64]) -> f64 {
        (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
    }

    #[test]
    fn mixdown_is_normalized_and_faded() {
        let mut engine = ResonanceEngine::with_seed(8000, 3.0, 9).unwrap();
        let wave = engine.carriers(432.0, 436.0).unwrap();
        let wave = engine.add_harmonics(wave, 432.0, 3).unwrap();
        let spec = RenderSpec {
            noise: NoiseSpec { beta: 1.1, level: 0.003 },
            hrv: HrvSpec::default(),
            ..quiet_spec()
        };
        let pcm = engine.mixdown(wave, &spec).unwrap();

        assert_eq!(pcm.frames(), 24_000);
        assert_eq!(pcm.samples[0], 0);
        assert_eq!(pcm.samples[1], 0);
        assert_eq!(pcm.samples[pcm.samples.len() - 2], 0);
        assert_eq!(pcm.samples[pcm.samples.len() - 1], 0);
        let peak = pcm.samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert_eq!(peak, 32767);
    }

    #[test]
    fn fade_ramps_are_monotonic() {
        let mut engine = ResonanceEngine::with_seed(8000, 3.0, 4).unwrap();
        let wave = engine.carriers(432.0, 436.0).unwrap();
        let pcm = engine.mixdown(wave, &quiet_spec()).unwrap();
        let left: Vec<f64> = pcm.left().map(|s| s as f64 / 32767.0).collect();

        // 10 blocks of 0.1 s across each 1 s ramp
        let rising: Vec<f64> = (0..10).map(|b| block_rms(&left[b * 800..(b + 1) * 800])).collect();
        for w in rising.windows(2) {
            assert!(w[1] > w[0], "fade-in not rising: {rising:?}");
        }
        let end = left.len();
        let falling: Vec<f64> = (0..10)
            .map(|b| block_rms(&left[end - 8000 + b * 800..end - 8000 + (b + 1) * 800]))
            .collect();
        for w in falling.windows(2) {
            assert!(w[1] < w[0], "fade-out not falling: {falling:?}");
        }
    }

    #[test]
    fn rejects_bad_parameters_before_rendering() {
        let mut engine = ResonanceEngine::with_seed(8000, 1.0, 4).unwrap();
        let wave = engine.carriers(432.0, 436.0).unwrap();

        let too_long_fade = RenderSpec { fade_seconds: 0.6, ..quiet_spec() };
        assert!(engine.mixdown(wave.clone(), &too_long_fade).is_err());

        let mut bad_floor = quiet_spec();
        bad_floor.hrv.floor = 0.0;
        bad_floor.fade_seconds = 0.1;
        assert!(engine.mixdown(wave.clone(), &bad_floor).is_err());

        let mut bad_noise = quiet_spec();
        bad_noise.noise.level = -1.0;
        bad_noise.fade_seconds = 0.1;
        assert!(engine.mixdown(wave, &bad_noise).is_err());
    }

    #[test]
    fn rejects_non_finite_input() {
        let mut engine = ResonanceEngine::with_seed(100, 1.0, 4).unwrap();
        let mut left = vec![0.0; 100];
        left[37] = f64::INFINITY;
        let wave = StereoWave::new(left, vec![0.0; 100]).unwrap();
        let spec = RenderSpec { fade_seconds: 0.1, ..quiet_spec() };
        let err = engine.mixdown(wave, &spec).unwrap_err();
        assert!(matches!(err, ResonanceError::NonFinite { index: 37 }));
    }

    #[test]
    fn overflowing_pulse_is_an_error_not_silence() {
        let mut engine = ResonanceEngine::with_seed(8000, 1.0, 4).unwrap();
        let wave = engine.carriers(432.0, 436.0).unwrap();
        let mut spec = quiet_spec();
        spec.fade_seconds = 0.1;
        spec.hrv.base_rate = 1e308;
        let err = engine.mixdown(wave, &spec).unwrap_err();
        assert!(matches!(err, ResonanceError::NonFinite { .. }), "{err}");
    }

    #[test]
    fn oversized_noise_level_is_rejected() {
        let mut engine = ResonanceEngine::with_seed(8000, 1.0, 4).unwrap();
        let wave = engine.carriers(432.0, 436.0).unwrap();
        let mut spec = quiet_spec();
        spec.fade_seconds = 0.1;
        spec.noise.level = 1e308;
        assert!(matches!(
            engine.mixdown(wave, &spec),
            Err(ResonanceError::InvalidParameter { name: "noise_level", .. })
        ));
    }

    #[test]
    fn encoded_header_is_valid() {
        let pcm = PcmBuffer {
            sample_rate: 44100,
            samples: vec![0, 0, 100, -100],
        };
        let wav = encode_wav(&pcm).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");

        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);
        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);
        let bits = u16::from_le_bytes([wav[34], wav[35]]);
        assert_eq!(bits, 16);
    }

    #[test]
    fn write_then_read_back() {
        let path = std::env::temp_dir().join(format!(
            "resonance_renderer_{}.wav",
            std::process::id()
        ));
        let pcm = PcmBuffer {
            sample_rate: 8000,
            samples: vec![0, 0, 16384, -16384, 32767, -32767],
        };
        write_wav(&path, &pcm).unwrap();
        let (wave, sr) = read_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(sr, 8000);
        assert_eq!(wave.len(), 3);
        assert!((wave.left()[1] - 16384.0 / 32767.0).abs() < 1e-12);
        assert!((wave.right()[1] + 16384.0 / 32767.0).abs() < 1e-12);
        assert_eq!(wave.left()[2], 1.0);
        assert_eq!(wave.right()[2], -1.0);
    }

    #[test]
    fn writer_errors_surface() {
        let pcm = PcmBuffer {
            sample_rate: 8000,
            samples: vec![0, 0],
        };
        let bad = Path::new("/nonexistent-dir/for/sure/out.wav");
        assert!(matches!(write_wav(bad, &pcm), Err(ResonanceError::Wav(_))));
    }
}
