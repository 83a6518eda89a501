use anyhow::Context;
use eframe::NativeOptions;
use salescast::config::{ConfigManager, DEFAULT_CONFIG_FILE};
use salescast::ui::SalescastApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let manager = ConfigManager::load_layered(DEFAULT_CONFIG_FILE)
        .context("Failed to load configuration")?;
    let config = manager.get();
    log::info!(
        "Default dataset: {}, order {}",
        config.data.default_dataset.display(),
        config.forecast.order
    );

    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("Salescast - Sales Forecasting"),
        ..Default::default()
    };

    eframe::run_native(
        "Salescast",
        native_options,
        Box::new(move |cc| Ok(Box::new(SalescastApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start dashboard: {}", e))
}
