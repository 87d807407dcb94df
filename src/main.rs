// GUI-subsystem binary in release builds: Windows never allocates a console.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;
use photoredact::app::PhotoRedactApp;
use photoredact::cli::LaunchArgs;
use photoredact::logger;

fn main() -> Result<(), eframe::Error> {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let args = LaunchArgs::from_env();

    // Define the native window options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("Photo_Redact"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "PhotoRedact",
        options,
        Box::new(move |cc| Box::new(PhotoRedactApp::new(cc, args.file))),
    )
}
