mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use resonance_engine::dsp::analysis::dominant_frequency;
use resonance_engine::dsp::renderer;
use resonance_engine::preset::{Preset, RenderOptions};

use crate::cli::{Args, Command};

fn init_tracing() {
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let fmt_layer = fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

fn load_preset(name: &str, file: Option<&Path>) -> Result<Preset> {
    match file {
        Some(path) => Preset::from_json_file(path)
            .with_context(|| format!("loading preset from {}", path.display())),
        None => Preset::find(name).context("looking up built-in preset"),
    }
}

fn list(json: bool) -> Result<()> {
    let presets = Preset::builtin();
    if json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }
    for p in &presets {
        println!(
            "{:<12} {:>5.1} Hz beat  {:>4} s  {}",
            p.name,
            p.beat_hz(),
            p.duration_seconds,
            p.description
        );
    }
    Ok(())
}

fn analyze(path: &Path) -> Result<()> {
    let (wave, sample_rate) =
        renderer::read_wav(path).with_context(|| format!("reading {}", path.display()))?;
    let left = dominant_frequency(wave.left(), sample_rate);
    let right = dominant_frequency(wave.right(), sample_rate);
    println!("sample rate : {sample_rate} Hz");
    println!("duration    : {:.2} s", wave.len() as f64 / sample_rate as f64);
    println!("left peak   : {left:.2} Hz");
    println!("right peak  : {right:.2} Hz");
    println!("beat        : {:.2} Hz", (right - left).abs());
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    match args.command {
        Command::Render {
            preset,
            preset_file,
            duration,
            sample_rate,
            seed,
            output,
        } => {
            let preset = load_preset(&preset, preset_file.as_deref())?;
            let options = RenderOptions {
                sample_rate,
                duration,
                seed,
            };
            let pcm = preset
                .render(&options, &output)
                .with_context(|| format!("rendering {} to {}", preset.name, output.display()))?;
            info!(
                preset = %preset.name,
                path = %output.display(),
                seconds = pcm.duration_seconds(),
                "done"
            );
        }
        Command::List { json } => list(json)?,
        Command::Analyze { path } => analyze(&path)?,
    }
    Ok(())
}
