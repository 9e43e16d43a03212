use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use syncwatch_config::{ConfigLoaderOptions, ConfigOverrides, ConfigRole};

/// Command-line flags. Every flag overrides the matching `SYNCWATCH_*`
/// environment variable and `syncwatch.toml` entry.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "syncwatch")]
#[command(about = "Keep a local mpv in sync with a remote playback controller")]
pub struct Cli {
    /// Path to syncwatch.toml
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Path to a .env file loaded before the environment is read
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Controller base URL, e.g. `https://watch.example/`
    #[arg(long, env = "SYNCWATCH_CONTROLLER_URL")]
    pub controller_url: Option<String>,

    /// State feed URL (defaults to the controller URL + `ws`)
    #[arg(long, env = "SYNCWATCH_FEED_URL")]
    pub feed_url: Option<String>,

    /// Admin credential sent with controller commands
    #[arg(long, env = "SYNCWATCH_CREDENTIAL", hide_env_values = true)]
    pub credential: Option<String>,

    /// Wait between state feed reconnect attempts, e.g. `5s`
    #[arg(
        long,
        env = "SYNCWATCH_RECONNECT_DELAY",
        value_parser = parse_duration
    )]
    pub reconnect_delay: Option<Duration>,

    /// How long a self-issued player command may take to echo back
    #[arg(
        long,
        env = "SYNCWATCH_SELF_ACTION_TIMEOUT",
        value_parser = parse_duration
    )]
    pub self_action_timeout: Option<Duration>,

    /// mpv executable
    #[arg(long, env = "SYNCWATCH_MPV_PATH")]
    pub mpv: Option<String>,

    /// mpv IPC socket path
    #[arg(long, env = "SYNCWATCH_MPV_SOCKET")]
    pub mpv_socket: Option<PathBuf>,

    /// Do not read admin commands from stdin
    #[arg(long, default_value_t = false)]
    pub no_console: bool,
}

impl Cli {
    pub fn loader_options(&self) -> ConfigLoaderOptions {
        ConfigLoaderOptions {
            config_path: self.config.clone(),
            env_file: self.env_file.clone(),
            role: ConfigRole::Follower,
        }
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            controller_url: self.controller_url.clone(),
            feed_url: self.feed_url.clone(),
            credential: self.credential.clone(),
            reconnect_delay: self.reconnect_delay,
            self_action_timeout: self.self_action_timeout,
            mpv_path: self.mpv.clone(),
            mpv_socket: self.mpv_socket.clone(),
            ..ConfigOverrides::default()
        }
    }
}

fn parse_duration(raw: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(raw)
}
