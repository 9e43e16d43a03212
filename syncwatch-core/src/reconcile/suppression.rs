//! Single-slot markers distinguishing engine-caused player notifications
//! from user intent.

use std::time::{Duration, Instant};

use crate::surface::SurfaceNotification;

/// Default lifetime of an armed marker when the player never reports the
/// matching notification (e.g. `play` on an already playing player).
pub const DEFAULT_SELF_ACTION_TIMEOUT: Duration = Duration::from_secs(2);

/// Kinds of corrective command the engine sends to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelfActionKind {
    Play,
    Pause,
    Seek,
}

impl SelfActionKind {
    /// The marker a notification would clear.
    pub fn matching(notification: SurfaceNotification) -> Self {
        match notification {
            SurfaceNotification::Playing => SelfActionKind::Play,
            SurfaceNotification::Paused => SelfActionKind::Pause,
            SurfaceNotification::Seeked => SelfActionKind::Seek,
        }
    }
}

/// One mailbox per [`SelfActionKind`]. Re-arming overwrites; nothing queues.
#[derive(Debug, Clone)]
pub struct SelfActionMarkers {
    play: Option<Instant>,
    pause: Option<Instant>,
    seek: Option<Instant>,
    timeout: Duration,
}

impl SelfActionMarkers {
    pub fn new(timeout: Duration) -> Self {
        Self {
            play: None,
            pause: None,
            seek: None,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn arm(&mut self, kind: SelfActionKind, now: Instant) {
        *self.slot_mut(kind) = Some(now);
    }

    /// Clears the marker for `kind`, returning whether it was still live.
    ///
    /// An expired marker is cleared as well but reports `false`, so a late
    /// notification is treated as user intent.
    pub fn take(&mut self, kind: SelfActionKind, now: Instant) -> bool {
        let timeout = self.timeout;
        match self.slot_mut(kind).take() {
            Some(armed_at) => {
                now.saturating_duration_since(armed_at) <= timeout
            }
            None => false,
        }
    }

    pub fn is_armed(&self, kind: SelfActionKind, now: Instant) -> bool {
        self.slot(kind).is_some_and(|armed_at| {
            now.saturating_duration_since(armed_at) <= self.timeout
        })
    }

    /// Live markers, in play/pause/seek order.
    pub fn outstanding(&self, now: Instant) -> Vec<SelfActionKind> {
        [SelfActionKind::Play, SelfActionKind::Pause, SelfActionKind::Seek]
            .into_iter()
            .filter(|kind| self.is_armed(*kind, now))
            .collect()
    }

    fn slot(&self, kind: SelfActionKind) -> Option<Instant> {
        match kind {
            SelfActionKind::Play => self.play,
            SelfActionKind::Pause => self.pause,
            SelfActionKind::Seek => self.seek,
        }
    }

    fn slot_mut(&mut self, kind: SelfActionKind) -> &mut Option<Instant> {
        match kind {
            SelfActionKind::Play => &mut self.play,
            SelfActionKind::Pause => &mut self.pause,
            SelfActionKind::Seek => &mut self.seek,
        }
    }
}

impl Default for SelfActionMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_SELF_ACTION_TIMEOUT)
    }
}
