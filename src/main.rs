//! LCG Viz - an interactive Gaussian Bayesian network viewer
//!
//! Entry point for the application. Takes an optional path to a network
//! file; without one the built-in demo network is shown.

use std::path::PathBuf;

use eframe::egui;
use tracing_subscriber::EnvFilter;

use lcg_viz::app::VizApp;
use lcg_viz::persistence::{load_from_file, NetworkFile};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lcg_viz=info")),
        )
        .init();

    let file = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match load_from_file(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(path = %path.display(), "cannot load network: {}", e);
                std::process::exit(1);
            }
        },
        None => NetworkFile::demo(),
    };

    let config = file.draw_config();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width as f32, config.height as f32])
            .with_title(config.container.as_str()),
        ..Default::default()
    };

    eframe::run_native(
        "LCG Viz",
        options,
        Box::new(move |_cc| Ok(Box::new(VizApp::new(&file)))),
    )
}
