//! The authoritative playback clock.
//!
//! Position is `start_offset` while paused and `start_offset + elapsed since
//! unpause` while playing. Every change is published on a watch channel as
//! the feed message followers receive.

use std::time::Duration;

use syncwatch_model::{PlaybackState, StateFeedMessage};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::info;

#[derive(Debug)]
pub struct PlaybackClock {
    playback: PlaybackState,
    unpaused_at: Instant,
    start_offset: Duration,
    media_url: String,
    updates: watch::Sender<StateFeedMessage>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    /// Paused at zero with no media.
    pub fn new() -> Self {
        let (updates, _) = watch::channel(StateFeedMessage {
            ts_millis: 0,
            state: PlaybackState::Paused,
            media_url: String::new(),
        });
        Self {
            playback: PlaybackState::Paused,
            unpaused_at: Instant::now(),
            start_offset: Duration::ZERO,
            media_url: String::new(),
            updates,
        }
    }

    pub fn current_timestamp(&self) -> Duration {
        match self.playback {
            PlaybackState::Playing => {
                self.start_offset + self.unpaused_at.elapsed()
            }
            PlaybackState::Paused => self.start_offset,
        }
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    /// The feed message for this instant.
    pub fn snapshot(&self) -> StateFeedMessage {
        StateFeedMessage {
            ts_millis: u64::try_from(self.current_timestamp().as_millis())
                .unwrap_or(u64::MAX),
            state: self.playback,
            media_url: self.media_url.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StateFeedMessage> {
        self.updates.subscribe()
    }

    /// No-op when already paused.
    pub fn pause(&mut self) {
        if self.playback.is_paused() {
            return;
        }
        self.start_offset += self.unpaused_at.elapsed();
        self.playback = PlaybackState::Paused;
        self.publish("pause");
    }

    /// No-op when already playing.
    pub fn unpause(&mut self) {
        if self.playback.is_playing() {
            return;
        }
        self.unpaused_at = Instant::now();
        self.playback = PlaybackState::Playing;
        self.publish("unpause");
    }

    /// Moves the position without changing the play/pause flag.
    pub fn seek(&mut self, position: Duration) {
        self.unpaused_at = Instant::now();
        self.start_offset = position;
        self.publish("seek");
    }

    /// Switches media, pausing and rewinding to zero.
    pub fn change_media(&mut self, media_url: String) {
        self.playback = PlaybackState::Paused;
        self.start_offset = Duration::ZERO;
        self.media_url = media_url;
        self.publish("change_media");
    }

    fn publish(&self, cause: &'static str) {
        let message = self.snapshot();
        info!(
            cause,
            ts_millis = message.ts_millis,
            state = %message.state,
            media_url = %message.media_url,
            "playback state changed"
        );
        self.updates.send_replace(message);
    }
}
