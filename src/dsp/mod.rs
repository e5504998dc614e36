//! DSP — closed-form synthesis stages and the offline renderer.
//!
//! Every stage is a pure function of the sample index, the engine
//! configuration, and the engine's phase set. The same code powers the CLI
//! renderer (WAV files) and the WASM entry point (WAV bytes).

pub mod analysis;
pub mod engine;
pub mod envelope;
pub mod harmonics;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod phase;
pub mod pulse;
pub mod renderer;
pub mod wave;

pub use engine::{EngineConfig, ResonanceEngine};
pub use mixer::PcmBuffer;
pub use noise::NoiseSpec;
pub use pulse::HrvSpec;
pub use renderer::RenderSpec;
pub use wave::StereoWave;
