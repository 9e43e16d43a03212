use std::time::Duration;

use thiserror::Error;

use super::models::{Config, ConfigRole};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("controller URL `{url}` must use http or https")]
    InvalidControllerScheme { url: String },
    #[error("state feed URL `{url}` must use ws or wss")]
    InvalidFeedScheme { url: String },
    #[error("admin password must not be empty")]
    EmptyAdminPassword,
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.items.iter().any(|w| w.message.contains(needle))
    }
}

/// Rejects unusable settings and collects warnings relevant to `role`.
pub fn apply_guard_rails(
    config: &Config,
    role: ConfigRole,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();
    match role {
        ConfigRole::Follower => follower_rails(config, &mut warnings)?,
        ConfigRole::Controller => controller_rails(config, &mut warnings)?,
    }
    Ok(warnings)
}

fn follower_rails(
    config: &Config,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    let base = &config.controller.base_url;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ConfigGuardRailError::InvalidControllerScheme {
            url: base.to_string(),
        });
    }
    let feed = &config.controller.feed_url;
    if !matches!(feed.scheme(), "ws" | "wss") {
        return Err(ConfigGuardRailError::InvalidFeedScheme {
            url: feed.to_string(),
        });
    }

    require_non_zero("sync.reconnect_delay", config.sync.reconnect_delay)?;
    require_non_zero(
        "controller.request_timeout",
        config.controller.request_timeout,
    )?;

    if config.controller.credential.is_none() {
        warnings.push_with_hint(
            "No admin credential configured; controller commands will be rejected",
            "Type `password <secret>` in the console or set SYNCWATCH_CREDENTIAL",
        );
    }

    if config.sync.self_action_timeout.is_zero() {
        warnings.push(
            "sync.self_action_timeout is zero; every player notification will be treated as user input",
        );
    }

    if base.scheme() == "http" && !is_loopback(base) {
        warnings.push(
            "Controller is reached over plain http; the admin credential travels unencrypted",
        );
    }

    Ok(())
}

fn controller_rails(
    config: &Config,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    require_non_zero(
        "server.heartbeat_interval",
        config.server.heartbeat_interval,
    )?;

    if config.server.admin_password.is_empty() {
        return Err(ConfigGuardRailError::EmptyAdminPassword);
    }
    if config.server.is_default_password() {
        warnings.push_with_hint(
            "Controller admin password is the built-in default",
            "Set SYNCWATCH_ADMIN_PASSWORD or server.admin_password before exposing the controller",
        );
    }

    Ok(())
}

fn require_non_zero(
    field: &'static str,
    value: Duration,
) -> Result<(), ConfigGuardRailError> {
    if value.is_zero() {
        return Err(ConfigGuardRailError::ZeroDuration { field });
    }
    Ok(())
}

fn is_loopback(url: &url::Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain == "localhost",
        Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
        Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}
