use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
///
/// Durations are humantime strings (`"5s"`, `"1500ms"`) and are parsed when
/// the configuration is composed.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub controller: FileControllerConfig,
    #[serde(default)]
    pub sync: FileSyncConfig,
    #[serde(default)]
    pub player: FilePlayerConfig,
    #[serde(default)]
    pub server: FileServerConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileControllerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileSyncConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconnect_delay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_action_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilePlayerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpv_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipc_socket: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_interval: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub controller_url: Option<String>,
    pub feed_url: Option<String>,
    pub credential: Option<String>,
    pub request_timeout: Option<String>,
    pub reconnect_delay: Option<String>,
    pub self_action_timeout: Option<String>,
    pub mpv_path: Option<String>,
    pub mpv_socket: Option<PathBuf>,
    pub mpv_args: Option<Vec<String>>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub admin_password: Option<String>,
    pub heartbeat_interval: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the environment view from an arbitrary lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name).filter(|value| !value.trim().is_empty())
        };

        EnvConfig {
            config_path: var("SYNCWATCH_CONFIG").map(PathBuf::from),
            controller_url: var("SYNCWATCH_CONTROLLER_URL"),
            feed_url: var("SYNCWATCH_FEED_URL"),
            credential: var("SYNCWATCH_CREDENTIAL"),
            request_timeout: var("SYNCWATCH_REQUEST_TIMEOUT"),
            reconnect_delay: var("SYNCWATCH_RECONNECT_DELAY"),
            self_action_timeout: var("SYNCWATCH_SELF_ACTION_TIMEOUT"),
            mpv_path: var("SYNCWATCH_MPV_PATH"),
            mpv_socket: var("SYNCWATCH_MPV_SOCKET").map(PathBuf::from),
            mpv_args: var("SYNCWATCH_MPV_ARGS").map(|raw| parse_csv(&raw)),
            server_host: var("SYNCWATCH_HOST"),
            server_port: var("SYNCWATCH_PORT")
                .and_then(|s| s.trim().parse().ok()),
            admin_password: var("SYNCWATCH_ADMIN_PASSWORD"),
            heartbeat_interval: var("SYNCWATCH_HEARTBEAT_INTERVAL"),
        }
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn reads_prefixed_variables() {
        let env = EnvConfig::from_lookup(lookup(&[
            ("SYNCWATCH_CONTROLLER_URL", "http://10.0.0.2:8080"),
            ("SYNCWATCH_PORT", "9000"),
            ("SYNCWATCH_MPV_ARGS", "--no-terminal, --volume=50,,"),
        ]));

        assert_eq!(env.controller_url.as_deref(), Some("http://10.0.0.2:8080"));
        assert_eq!(env.server_port, Some(9000));
        assert_eq!(
            env.mpv_args,
            Some(vec!["--no-terminal".to_string(), "--volume=50".to_string()])
        );
    }

    #[test]
    fn blank_and_unparseable_values_are_unset() {
        let env = EnvConfig::from_lookup(lookup(&[
            ("SYNCWATCH_CREDENTIAL", "   "),
            ("SYNCWATCH_PORT", "eighty"),
        ]));

        assert!(env.credential.is_none());
        assert!(env.server_port.is_none());
    }

    #[test]
    fn file_config_rejects_unknown_keys() {
        let raw = "[server]\nport = 9000\nadmin_pasword = \"typo\"\n";
        assert!(toml::from_str::<FileConfig>(raw).is_err());
    }
}
