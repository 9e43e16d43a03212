//! Shared configuration library for Syncwatch.
//!
//! Both binaries load their settings through [`ConfigLoader`]: `.env` first,
//! then `SYNCWATCH_*` environment variables, then an optional TOML file,
//! with command line overrides on top. Loading never touches the network;
//! non-fatal issues come back as [`ConfigWarnings`] for the caller to log.

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{
    ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions,
    ConfigOverrides,
};
pub use models::{
    Config, ConfigMetadata, ConfigRole, ControllerConfig, PlayerConfig,
    ServerConfig, SyncConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
