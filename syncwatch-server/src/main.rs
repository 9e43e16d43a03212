//! # Syncwatch Server
//!
//! Controller binary: serves the command routes and the state feed.

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use syncwatch_config::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, ConfigOverrides, ConfigRole,
};
use syncwatch_server::{AppState, routes};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "syncwatch-server")]
#[command(about = "Authoritative playback controller for syncwatch followers")]
struct Cli {
    /// Path to syncwatch.toml
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Path to a .env file loaded before the environment is read
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SYNCWATCH_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SYNCWATCH_HOST")]
    host: Option<String>,

    /// Admin password followers must send with commands
    #[arg(
        short,
        long,
        env = "SYNCWATCH_ADMIN_PASSWORD",
        hide_env_values = true
    )]
    admin_password: Option<String>,

    /// State re-broadcast period, e.g. `5s`
    #[arg(
        long,
        env = "SYNCWATCH_HEARTBEAT_INTERVAL",
        value_parser = parse_duration
    )]
    heartbeat_interval: Option<Duration>,
}

fn parse_duration(raw: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(raw)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = ConfigLoaderOptions {
        config_path: cli.config,
        env_file: cli.env_file,
        role: ConfigRole::Controller,
    };
    let ConfigLoad { config, warnings } = ConfigLoader::with_options(options)
        .with_overrides(ConfigOverrides {
            server_host: cli.host,
            server_port: cli.port,
            admin_password: cli.admin_password,
            heartbeat_interval: cli.heartbeat_interval,
            ..ConfigOverrides::default()
        })
        .load()
        .context("failed to load configuration")?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => warn!(
                message = %warning.message,
                hint = %hint,
                "configuration warning"
            ),
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    let server = config.server;
    let state = AppState::new(
        server.admin_password.as_str(),
        server.heartbeat_interval,
    );
    let app = routes::create_router(state);

    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(
        address = %address,
        heartbeat = %humantime::format_duration(server.heartbeat_interval),
        "syncwatch controller listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("syncwatch controller stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
