//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use resonance_engine::preset::DEFAULT_SAMPLE_RATE;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "resonance")]
#[command(author, version, about = "Binaural beat renderer with golden-ratio harmonics", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a preset to a 16-bit stereo WAV file
    Render {
        /// Built-in preset name (see `list`)
        #[arg(long, default_value = "true-theta", conflicts_with = "preset_file")]
        preset: String,

        /// Load the preset from a JSON file instead
        #[arg(long, value_name = "PATH")]
        preset_file: Option<PathBuf>,

        /// Override the preset's duration
        #[arg(long, value_name = "SECONDS")]
        duration: Option<f64>,

        #[arg(long, value_name = "HZ", default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,

        /// Fix all random phases for a reproducible render
        #[arg(long)]
        seed: Option<u64>,

        /// Output WAV path
        #[arg(short, long, value_name = "PATH", default_value = "resonance.wav")]
        output: PathBuf,
    },

    /// List the built-in presets
    List {
        /// Print full JSON instead of a summary table
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Report the dominant frequency of each channel and the beat between them
    Analyze {
        #[arg(value_name = "WAV_PATH")]
        path: PathBuf,
    },
}
