//! # Syncwatch Core
//!
//! Follower-side logic for Syncwatch: keeps a local media player aligned with
//! the playback state broadcast by a single authoritative controller.
//!
//! ## Overview
//!
//! - **Reconciliation**: [`reconcile::ReconciliationEngine`] compares every
//!   authoritative state event with what the local player reports and issues
//!   at most one seek and one play-or-pause to converge.
//! - **Self-action suppression**: every command the engine sends to the
//!   player arms a single-slot marker, so the notification it provokes is not
//!   mistaken for user intent and never re-triggers reconciliation.
//! - **Feed supervision**: [`supervisor::ReconnectionSupervisor`] keeps the
//!   state feed connected, waiting a fixed delay between attempts.
//! - **Session dispatch**: [`session::SyncSession`] is the single-threaded
//!   loop feeding the engine, one event at a time.
//! - **Admin commands**: [`admin`] parses console input into controller
//!   commands, sent through a [`commands::CommandChannel`].
//!
//! ## Seams
//!
//! The player, the feed transport and the command transport are traits
//! ([`surface::MediaSurface`], [`feed::StateFeed`],
//! [`commands::CommandChannel`]); concrete adapters live in
//! `syncwatch-player`.
//!
//! ## Example
//!
//! ```no_run
//! use syncwatch_core::reconcile::ReconciliationEngine;
//! use syncwatch_core::surface::{MediaSurface, ObservedPlayerState};
//! use syncwatch_model::{AuthoritativeState, PlaybackState};
//!
//! struct Headless(ObservedPlayerState);
//!
//! impl MediaSurface for Headless {
//!     fn observe(&self) -> ObservedPlayerState {
//!         self.0.clone()
//!     }
//!     fn set_source(&mut self, locator: &str) {
//!         self.0.source_locator = Some(locator.to_string());
//!     }
//!     fn play(&mut self) {
//!         self.0.paused = false;
//!     }
//!     fn pause(&mut self) {
//!         self.0.paused = true;
//!     }
//!     fn seek(&mut self, position_secs: f64) {
//!         self.0.position_secs = position_secs;
//!     }
//! }
//!
//! let surface = Headless(ObservedPlayerState::default());
//! let mut engine = ReconciliationEngine::new(surface);
//! let actions = engine.on_authoritative_event(AuthoritativeState::new(
//!     10_000,
//!     PlaybackState::Playing,
//!     "x.mp4",
//! ));
//! println!("converged with {} corrective actions", actions.len());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Admin console input parsing and command issuing
pub mod admin;

/// Monotonic clock abstraction used for extrapolation and marker expiry
pub mod clock;

/// Outbound controller command seam and credential storage
pub mod commands;

/// Error types shared by the core seams
pub mod error;

/// State feed seam and frame decoding
pub mod feed;

/// Playback reconciliation state machine
pub mod reconcile;

/// Single-threaded event dispatch into the reconciliation engine
pub mod session;

/// Reconnection supervision for the state feed
pub mod supervisor;

/// Local media player seam
pub mod surface;

pub use error::{CommandError, FeedError, SurfaceError};
pub use reconcile::{
    CorrectiveAction, DRIFT_THRESHOLD_SECS, NotificationOutcome,
    ReconciliationEngine,
};
pub use session::{SessionEvent, SessionSnapshot, SyncSession};
pub use supervisor::{DEFAULT_RECONNECT_DELAY, ReconnectionSupervisor};
pub use surface::{MediaSurface, ObservedPlayerState, SurfaceNotification};
