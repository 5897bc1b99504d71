//! Main application entry point.

use deskpin_app::{App, AppConfig, ShortcutRegistry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().skip(1).any(|arg| arg == "--shortcuts") {
        ShortcutRegistry::print_all();
        return Ok(());
    }

    env_logger::init();
    log::info!("Starting Deskpin");

    App::run(AppConfig::from_env())?;
    Ok(())
}
