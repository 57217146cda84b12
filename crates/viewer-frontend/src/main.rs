//! GLB Viewer main entry point

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "viewer_frontend=debug,viewer_core=debug,viewer_renderer=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting GLB Viewer");

    let config_manager = viewer_frontend::config::ConfigManager::new();
    tracing::debug!(
        "Config file: {}",
        config_manager.config_file_path().display()
    );
    let config = config_manager.into_config(std::env::args().nth(1));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([320.0, 240.0])
            .with_title("GLB Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "glb-viewer",
        native_options,
        Box::new(|cc| Ok(Box::new(viewer_frontend::ViewerApp::new(cc, config)?))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {}
