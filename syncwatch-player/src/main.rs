use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use syncwatch_config::ConfigLoader;
use syncwatch_player::app::{self, RunOptions};
use syncwatch_player::cli::Cli;

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("syncwatch_player", LevelFilter::Debug)
        .filter_module("syncwatch_core", LevelFilter::Info)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let load = ConfigLoader::with_options(cli.loader_options())
        .with_overrides(cli.overrides())
        .load()
        .context("failed to load configuration")?;

    if load.config.metadata.env_file_loaded {
        log::info!("Loaded .env file");
    }
    if let Some(path) = load.source_path() {
        log::info!("Using configuration from {}", path.display());
    }
    for warning in load.warnings.iter() {
        match &warning.hint {
            Some(hint) => log::warn!("{} ({})", warning.message, hint),
            None => log::warn!("{}", warning.message),
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let result = runtime.block_on(app::run(
        load.config,
        RunOptions {
            console: !cli.no_console,
        },
    ));

    // A pending stdin read would otherwise hold shutdown open.
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}
