//! The local player as seen by the reconciliation engine.

use std::fmt;

/// A point-in-time read of the local player. Never cached by the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservedPlayerState {
    pub position_secs: f64,
    pub paused: bool,
    /// `None` until a source has been loaded.
    pub source_locator: Option<String>,
}

impl ObservedPlayerState {
    pub fn has_source(&self, locator: &str) -> bool {
        self.source_locator.as_deref() == Some(locator)
    }
}

/// Change notifications emitted by the player, whoever caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceNotification {
    /// The paused flag flipped to paused.
    Paused,
    /// The paused flag flipped to playing (user, engine, or end of a
    /// buffering stall).
    Playing,
    /// A seek completed.
    Seeked,
}

impl fmt::Display for SurfaceNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceNotification::Paused => f.write_str("paused"),
            SurfaceNotification::Playing => f.write_str("playing"),
            SurfaceNotification::Seeked => f.write_str("seeked"),
        }
    }
}

/// Local media player driven by the engine.
///
/// Commands are fire-and-forget: an implementation that cannot satisfy one
/// (no source loaded, IPC hiccup) absorbs and logs the failure. The engine
/// only ever derives authoritative state from the feed, so a dropped command
/// is corrected by the next event.
pub trait MediaSurface {
    fn observe(&self) -> ObservedPlayerState;

    /// Loads a new source. Per normal media-loading semantics this resets the
    /// position and may pause playback.
    fn set_source(&mut self, locator: &str);

    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, position_secs: f64);
}

impl<T: MediaSurface + ?Sized> MediaSurface for Box<T> {
    fn observe(&self) -> ObservedPlayerState {
        (**self).observe()
    }

    fn set_source(&mut self, locator: &str) {
        (**self).set_source(locator)
    }

    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn seek(&mut self, position_secs: f64) {
        (**self).seek(position_secs)
    }
}
