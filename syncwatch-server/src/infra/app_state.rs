use std::{fmt, sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::playback_clock::PlaybackClock;

#[derive(Clone)]
pub struct AppState {
    pub clock: Arc<Mutex<PlaybackClock>>,
    pub admin_password: Arc<str>,
    /// Period of the state re-broadcast on every feed connection.
    pub heartbeat_interval: Duration,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("heartbeat_interval", &self.heartbeat_interval)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        admin_password: impl Into<Arc<str>>,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            clock: Arc::new(Mutex::new(PlaybackClock::new())),
            admin_password: admin_password.into(),
            heartbeat_interval,
        }
    }
}
