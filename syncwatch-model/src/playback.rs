use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Play/pause flag as declared by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlaybackState {
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    pub fn is_paused(self) -> bool {
        matches!(self, PlaybackState::Paused)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last state broadcast by the controller.
///
/// Replaced wholesale on every feed event; never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoritativeState {
    pub position_millis: u64,
    pub playback: PlaybackState,
    /// Empty when the controller has not selected any media yet.
    pub media_locator: String,
}

impl AuthoritativeState {
    pub fn new(
        position_millis: u64,
        playback: PlaybackState,
        media_locator: impl Into<String>,
    ) -> Self {
        Self {
            position_millis,
            playback,
            media_locator: media_locator.into(),
        }
    }

    pub fn position_secs(&self) -> f64 {
        self.position_millis as f64 / 1000.0
    }

    pub fn has_media(&self) -> bool {
        !self.media_locator.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_controller_vocabulary() {
        assert_eq!(PlaybackState::Playing.to_string(), "Playing");
        assert_eq!(PlaybackState::Paused.to_string(), "Paused");
        assert!(PlaybackState::Paused.is_paused());
        assert!(!PlaybackState::Paused.is_playing());
    }

    #[test]
    fn position_secs_is_fractional() {
        let state = AuthoritativeState::new(1500, PlaybackState::Paused, "");
        assert_eq!(state.position_secs(), 1.5);
        assert!(!state.has_media());
    }
}
