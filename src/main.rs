#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use convertext_gui::app::ConvertextApp;
use convertext_gui::config::AppConfig;
use convertext_gui::constants::{APP_NAME, APP_VERSION};
use convertext_gui::logging;

fn main() -> Result<(), eframe::Error> {
    let logging = match logging::init() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("failed to initialize logging: {:#}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting {} GUI v{}", APP_NAME, APP_VERSION);
    tracing::info!("Log directory: {}", logging.log_dir.display());

    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([700.0, 800.0])
            .with_title(APP_NAME)
            .with_resizable(true),
        ..Default::default()
    };

    let app_creator = move |cc: &eframe::CreationContext| -> Box<dyn eframe::App> {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Box::new(ConvertextApp::new(logging))
    };

    eframe::run_native(APP_NAME, options, Box::new(app_creator))
}
