pub mod dsp;
pub mod error;
pub mod preset;

use crate::dsp::renderer;
use crate::preset::{Preset, RenderOptions};
use wasm_bindgen::prelude::*;

pub use crate::error::{ResonanceError, Result};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the resonance-engine version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Render a built-in preset to WAV bytes in memory.
///
/// A non-positive `duration` keeps the preset's own length.
pub fn render_preset_bytes(name: &str, sample_rate: u32, duration: f64) -> Result<Vec<u8>> {
    let preset = Preset::find(name)?;
    let options = RenderOptions {
        sample_rate,
        duration: (duration > 0.0).then_some(duration),
        seed: None,
    };
    let pcm = preset.mixdown(&options)?;
    renderer::encode_wav(&pcm)
}

/// WASM-exposed: render a built-in preset to a WAV byte array.
#[wasm_bindgen]
pub fn render_preset_wav(name: &str, sample_rate: u32, duration: f64) -> std::result::Result<Vec<u8>, JsValue> {
    render_preset_bytes(name, sample_rate, duration).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: the built-in presets as a JSON-compatible array.
#[wasm_bindgen]
pub fn list_presets() -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&Preset::builtin()).map_err(|e| JsValue::from_str(&format!("{e}")))
}
