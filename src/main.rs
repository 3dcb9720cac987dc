use anyhow::Context;
use eframe::egui;

use revenue_lens::app::RevenueLensApp;
use revenue_lens::config::AppConfig;
use revenue_lens::state::DashboardContext;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!(
        "dataset: {}, model: {}",
        config.dataset_path.display(),
        config.model_path.display()
    );

    // Nothing is servable without the dataset.
    let context = DashboardContext::load(&config).context("startup failed")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "YouTube Ad Revenue Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(RevenueLensApp::new(context)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard: {e}"))
}
