mod app;
mod data;
mod error;
mod state;
mod ui;

use anyhow::Context;
use app::FloodSearchApp;
use data::config::AppPaths;
use data::query::QueryContext;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let paths = AppPaths::discover();
    log::info!("Data folder: {}", paths.base_dir.display());

    // The dropdowns cannot be populated without the cache.
    let state = AppState::open(paths, QueryContext::default())
        .context("building dropdown config")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Flood Data Search Tool",
        options,
        Box::new(|_cc| Ok(Box::new(FloodSearchApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
