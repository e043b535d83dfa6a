// Paletta — pick, extract and generate color palettes from images.
//
// Two modes share one binary:
// • GUI mode (default): eframe window with the image stage, markers and
//   palette panel.
// • CLI mode (--input/-i flag present): headless extraction, no window.

mod app;
mod cli;
mod color;
mod components;
mod geometry;
mod io;
mod loupe;
pub mod logger;
mod markers;
mod ops;
mod sampler;
mod session;

use std::process::ExitCode;

use app::PalettaApp;
use eframe::egui;

fn main() -> ExitCode {
    // -- CLI / headless mode ------------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        return cli::run(args);
    }

    // -- GUI mode -----------------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("Paletta")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    match eframe::run_native(
        "Paletta",
        options,
        Box::new(|cc| Box::new(PalettaApp::new(cc))),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            crate::log_err!("eframe terminated with an error: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
