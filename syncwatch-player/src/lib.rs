//! # Syncwatch Player
//!
//! The follower binary's building blocks: an mpv-backed
//! [`MediaSurface`](syncwatch_core::MediaSurface), the WebSocket state feed,
//! the HTTP command channel and the stdin admin console.

pub mod app;
pub mod cli;
pub mod domains;
pub mod infrastructure;
