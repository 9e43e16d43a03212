use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::{
    models::{
        Config, ConfigMetadata, ConfigRole, ControllerConfig,
        DEFAULT_ADMIN_PASSWORD, DEFAULT_CONTROLLER_URL,
        DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_MPV_PATH, DEFAULT_RECONNECT_DELAY,
        DEFAULT_REQUEST_TIMEOUT, DEFAULT_SELF_ACTION_TIMEOUT,
        DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, PlayerConfig, ServerConfig,
        SyncConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["syncwatch.toml", "config/syncwatch.toml"];

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub role: ConfigRole,
}

/// Values supplied on the command line. They beat every other source.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub controller_url: Option<String>,
    pub feed_url: Option<String>,
    pub credential: Option<String>,
    pub reconnect_delay: Option<Duration>,
    pub self_action_timeout: Option<Duration>,
    pub mpv_path: Option<String>,
    pub mpv_socket: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub admin_password: Option<String>,
    pub heartbeat_interval: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self {
            options,
            overrides: ConfigOverrides::default(),
        }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_role(mut self, role: ConfigRole) -> Self {
        self.options.role = role;
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Loads `.env`, gathers the process environment and composes the
    /// final configuration.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.compose(EnvConfig::gather(), env_file_loaded)
    }

    /// Same as [`ConfigLoader::load`] with a caller-supplied environment and
    /// no `.env` processing.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        self.compose(env, false)
    }

    fn compose(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) = self.compose_config(
            file_config,
            env,
            config_path,
            env_file_loaded,
        )?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let mut source = ConfigPathSource::default();

        if let Some(explicit) = &self.options.config_path {
            source.explicit = Some(explicit.clone());
        } else if let Some(from_env) = &env_config.config_path {
            source.env = Some(from_env.clone());
        }

        if source.is_empty() {
            source.default = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists());
        }

        let Some((path, provenance)) = source.resolved_path() else {
            return Ok((None, None));
        };

        if !path.exists() {
            if provenance.is_explicit() {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;
        debug!(path = %path.display(), "loaded configuration file");

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
        env_file_loaded: bool,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "No syncwatch.toml detected; using environment variables and defaults",
                "Create syncwatch.toml or point SYNCWATCH_CONFIG at a configuration file",
            );
        }

        let FileConfig {
            controller: file_controller,
            sync: file_sync,
            player: file_player,
            server: file_server,
        } = file_config.unwrap_or_default();
        let overrides = &self.overrides;

        let base_raw = overrides
            .controller_url
            .clone()
            .or(env.controller_url)
            .or(file_controller.url)
            .unwrap_or_else(|| DEFAULT_CONTROLLER_URL.to_string());
        let base_url =
            with_trailing_slash(parse_url("controller.url", &base_raw)?);

        let feed_url = match overrides
            .feed_url
            .clone()
            .or(env.feed_url)
            .or(file_controller.feed_url)
        {
            Some(raw) => parse_url("controller.feed_url", &raw)?,
            None => derive_feed_url(&base_url)?,
        };

        let controller = ControllerConfig {
            base_url,
            feed_url,
            credential: overrides
                .credential
                .clone()
                .or(env.credential)
                .or(file_controller.credential)
                .filter(|secret| !secret.is_empty()),
            request_timeout: resolve_duration(
                "controller.request_timeout",
                None,
                env.request_timeout.as_deref(),
                file_controller.request_timeout.as_deref(),
                DEFAULT_REQUEST_TIMEOUT,
            )?,
        };

        let sync = SyncConfig {
            reconnect_delay: resolve_duration(
                "sync.reconnect_delay",
                overrides.reconnect_delay,
                env.reconnect_delay.as_deref(),
                file_sync.reconnect_delay.as_deref(),
                DEFAULT_RECONNECT_DELAY,
            )?,
            self_action_timeout: resolve_duration(
                "sync.self_action_timeout",
                overrides.self_action_timeout,
                env.self_action_timeout.as_deref(),
                file_sync.self_action_timeout.as_deref(),
                DEFAULT_SELF_ACTION_TIMEOUT,
            )?,
        };

        let player = PlayerConfig {
            mpv_path: overrides
                .mpv_path
                .clone()
                .or(env.mpv_path)
                .or(file_player.mpv_path)
                .unwrap_or_else(|| DEFAULT_MPV_PATH.to_string()),
            ipc_socket: overrides
                .mpv_socket
                .clone()
                .or(env.mpv_socket)
                .or(file_player.ipc_socket)
                .unwrap_or_else(PlayerConfig::default_ipc_socket),
            extra_args: env
                .mpv_args
                .or(file_player.extra_args)
                .unwrap_or_default(),
        };

        let server = ServerConfig {
            host: overrides
                .server_host
                .clone()
                .or(env.server_host)
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            port: overrides
                .server_port
                .or(env.server_port)
                .or(file_server.port)
                .unwrap_or(DEFAULT_SERVER_PORT),
            admin_password: overrides
                .admin_password
                .clone()
                .or(env.admin_password)
                .or(file_server.admin_password)
                .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            heartbeat_interval: resolve_duration(
                "server.heartbeat_interval",
                overrides.heartbeat_interval,
                env.heartbeat_interval.as_deref(),
                file_server.heartbeat_interval.as_deref(),
                DEFAULT_HEARTBEAT_INTERVAL,
            )?,
        };

        let config = Config {
            controller,
            sync,
            player,
            server,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };

        let guard_warnings =
            validation::apply_guard_rails(&config, self.options.role)?;
        warnings.extend(guard_warnings);

        Ok((config, warnings))
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigLoadError> {
    Url::parse(raw.trim()).map_err(|source| ConfigLoadError::InvalidUrl {
        field,
        value: raw.to_string(),
        source,
    })
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// `http://host/base/` becomes `ws://host/base/ws`; https maps to wss.
fn derive_feed_url(base: &Url) -> Result<Url, ConfigLoadError> {
    let scheme = match base.scheme() {
        "https" => "wss",
        _ => "ws",
    };
    let mut feed = base.join("ws").map_err(|source| {
        ConfigLoadError::InvalidUrl {
            field: "controller.feed_url",
            value: base.to_string(),
            source,
        }
    })?;
    feed.set_scheme(scheme)
        .map_err(|()| ConfigLoadError::FeedUrlDerivation {
            url: base.to_string(),
        })?;
    Ok(feed)
}

fn resolve_duration(
    field: &'static str,
    cli: Option<Duration>,
    env: Option<&str>,
    file: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    if let Some(value) = cli {
        return Ok(value);
    }
    match env.or(file) {
        Some(raw) => humantime::parse_duration(raw.trim()).map_err(|source| {
            ConfigLoadError::InvalidDuration {
                field,
                value: raw.to_string(),
                source,
            }
        }),
        None => Ok(default),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid URL for {field}: `{value}`")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error(
        "cannot derive a WebSocket feed URL from `{url}`; set controller.feed_url"
    )]
    FeedUrlDerivation { url: String },
    #[error("invalid duration for {field}: `{value}`")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug, Default)]
struct ConfigPathSource {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    default: Option<PathBuf>,
}

impl ConfigPathSource {
    fn is_empty(&self) -> bool {
        self.explicit.is_none() && self.env.is_none() && self.default.is_none()
    }

    fn resolved_path(&self) -> Option<(PathBuf, ConfigPathProvenance)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigPathProvenance::Explicit));
        }
        if let Some(path) = &self.env {
            return Some((path.clone(), ConfigPathProvenance::Env));
        }
        if let Some(path) = &self.default {
            return Some((path.clone(), ConfigPathProvenance::Default));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigPathProvenance {
    Explicit,
    Env,
    Default,
}

impl ConfigPathProvenance {
    fn is_explicit(self) -> bool {
        matches!(
            self,
            ConfigPathProvenance::Explicit | ConfigPathProvenance::Env
        )
    }
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoad {
    /// Where the file layer came from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.config.metadata.config_path.as_deref()
    }
}
