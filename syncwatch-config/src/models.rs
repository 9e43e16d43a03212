use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_CONTROLLER_URL: &str = "http://127.0.0.1:8080/";
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_SELF_ACTION_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MPV_PATH: &str = "mpv";

/// Which binary is loading; selects the guard rails that apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigRole {
    #[default]
    Follower,
    Controller,
}

/// Fully resolved configuration shared by both binaries.
#[derive(Debug, Clone)]
pub struct Config {
    pub controller: ControllerConfig,
    pub sync: SyncConfig,
    pub player: PlayerConfig,
    pub server: ServerConfig,
    pub metadata: ConfigMetadata,
}

/// Where a follower finds its controller.
#[derive(Clone)]
pub struct ControllerConfig {
    /// Base for command routes; always ends with `/`.
    pub base_url: Url,
    /// WebSocket state feed.
    pub feed_url: Url,
    /// Admin credential sent with commands, if known at startup.
    pub credential: Option<String>,
    pub request_timeout: Duration,
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("base_url", &self.base_url.as_str())
            .field("feed_url", &self.feed_url.as_str())
            .field(
                "credential",
                &self.credential.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub reconnect_delay: Duration,
    pub self_action_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            self_action_timeout: DEFAULT_SELF_ACTION_TIMEOUT,
        }
    }
}

/// Local mpv process settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub mpv_path: String,
    pub ipc_socket: PathBuf,
    /// Extra arguments appended to the mpv command line.
    pub extra_args: Vec<String>,
}

impl PlayerConfig {
    pub fn default_ipc_socket() -> PathBuf {
        std::env::temp_dir().join("syncwatch-mpv.sock")
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_password: String,
    /// How often the current state is re-broadcast to feed subscribers.
    pub heartbeat_interval: Duration,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_default_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("admin_password", &"<redacted>")
            .field("heartbeat_interval", &self.heartbeat_interval)
            .finish()
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
