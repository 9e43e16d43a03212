//! HTTP and WebSocket handlers

pub mod auth;
pub mod commands;
pub mod feed;
pub mod state;
