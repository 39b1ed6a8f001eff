//! Interactive console: status panel plus a collection search field on stdin.
mod app;
mod render;
mod settings;

use std::env;
use std::path::PathBuf;

use console_logging::console_info;
use log::LevelFilter;

use settings::{load_settings, DEFAULT_SETTINGS_FILE};

pub fn run() -> anyhow::Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let settings = load_settings(&path)?;

    console_logging::initialize(settings.log_destination, LevelFilter::Info, &settings.log_file);
    console_info!("settings loaded from {:?}", path);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_app(settings))
}
