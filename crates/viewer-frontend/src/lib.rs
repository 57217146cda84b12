//! GLB Viewer Frontend
//!
//! eframe application that shows one binary glTF model with orbit controls,
//! as a native window or inside a web page.

mod app;
mod app_state;
pub mod config;
mod controller;
#[cfg(target_arch = "wasm32")]
mod dom;
mod error;
mod loader;
#[cfg(not(target_arch = "wasm32"))]
mod toolbar;
mod viewport_state;

pub use app::ViewerApp;
pub use error::AppError;

/// Browser entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() -> Result<(), wasm_bindgen::JsValue> {
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();
    tracing::info!("Starting GLB Viewer");

    let canvas = dom::canvas().map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))?;
    let config = config::ConfigManager::new().into_config(None);

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(|cc| Ok(Box::new(ViewerApp::new(cc, config)?))),
        )
        .await
}
