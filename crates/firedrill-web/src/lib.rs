//! Firedrill Web - browser build of the fire safety drill
//!
//! This crate provides the WASM entry point: it picks a scene from the page
//! URL, runs the Bevy app on the page's canvas, and asks the browser for an
//! immersive WebXR session when the scene wants one.

mod app;
mod scene_source;
mod xr;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build()
    );

    scene_source::load_and_run(app::run);
}
