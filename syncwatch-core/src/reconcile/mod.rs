//! Playback reconciliation state machine.
//!
//! The engine is the only owner of the follower's view of authoritative
//! state. It is driven from two places, both serialized by
//! [`crate::session::SyncSession`]:
//!
//! - [`ReconciliationEngine::on_authoritative_event`] for every feed event;
//! - [`ReconciliationEngine::on_surface_notification`] for every paused /
//!   playing / seeked notification the player emits.
//!
//! Driving the player makes it emit the same notifications a user would.
//! Before every corrective command the engine arms a [`SelfActionMarkers`]
//! slot for that command's kind; the next matching notification clears the
//! slot and is dropped instead of being treated as user intent.

mod receipt;
mod suppression;

use receipt::ReceiptStamp;
pub use suppression::{
    DEFAULT_SELF_ACTION_TIMEOUT, SelfActionKind, SelfActionMarkers,
};

use std::time::{Duration, Instant};

use syncwatch_model::{AuthoritativeState, PlaybackState};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::surface::{MediaSurface, SurfaceNotification};

/// Position divergence, in seconds, tolerated without a corrective seek.
pub const DRIFT_THRESHOLD_SECS: f64 = 1.0;

/// A command the engine sent to the player.
#[derive(Debug, Clone, PartialEq)]
pub enum CorrectiveAction {
    SetSource(String),
    Seek { position_secs: f64 },
    Play,
    Pause,
}

/// What the engine did with a player notification.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationOutcome {
    /// The notification was caused by the engine itself.
    Suppressed,
    /// User intent was overridden with a corrective action.
    Corrected(CorrectiveAction),
    /// Nothing to do: no authoritative state yet, or already aligned.
    Ignored,
}

/// Running counters, exposed for status displays and logs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStats {
    pub events_applied: u64,
    pub last_deviation_secs: Option<f64>,
    pub corrective_seeks: u64,
    pub corrective_plays: u64,
    pub corrective_pauses: u64,
    pub source_changes: u64,
    pub notifications_suppressed: u64,
    pub user_overrides: u64,
}

/// Reconciles a [`MediaSurface`] against the authoritative feed.
#[derive(Debug)]
pub struct ReconciliationEngine<S, C = SystemClock> {
    surface: S,
    clock: C,
    receipt: Option<ReceiptStamp>,
    markers: SelfActionMarkers,
    stats: EngineStats,
}

impl<S: MediaSurface> ReconciliationEngine<S, SystemClock> {
    pub fn new(surface: S) -> Self {
        Self::with_clock(surface, SystemClock)
    }
}

impl<S: MediaSurface, C: Clock> ReconciliationEngine<S, C> {
    pub fn with_clock(surface: S, clock: C) -> Self {
        Self {
            surface,
            clock,
            receipt: None,
            markers: SelfActionMarkers::default(),
            stats: EngineStats::default(),
        }
    }

    pub fn with_self_action_timeout(mut self, timeout: Duration) -> Self {
        self.markers = SelfActionMarkers::new(timeout);
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn last_state(&self) -> Option<&AuthoritativeState> {
        self.receipt.as_ref().map(|receipt| &receipt.state)
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Marker kinds still waiting for their notification.
    pub fn pending_self_actions(&self) -> Vec<SelfActionKind> {
        self.markers.outstanding(self.clock.now())
    }

    /// Extrapolated controller position right now, if any state arrived.
    pub fn expected_position_secs(&self) -> Option<f64> {
        let now = self.clock.now();
        self.receipt
            .as_ref()
            .map(|receipt| receipt.expected_position_secs(now))
    }

    /// Applies one authoritative state event.
    ///
    /// Issues at most one seek and at most one of play/pause, then replaces
    /// the stored state. Returns the commands sent, in order.
    pub fn on_authoritative_event(
        &mut self,
        event: AuthoritativeState,
    ) -> Vec<CorrectiveAction> {
        let now = self.clock.now();
        let mut actions = Vec::with_capacity(3);

        let mut observed = self.surface.observe();
        if event.has_media() && !observed.has_source(&event.media_locator) {
            info!(
                from = ?observed.source_locator,
                to = %event.media_locator,
                "switching media source"
            );
            self.surface.set_source(&event.media_locator);
            self.stats.source_changes += 1;
            actions.push(CorrectiveAction::SetSource(
                event.media_locator.clone(),
            ));
            // Loading resets the playhead; measure drift against the new one.
            observed = self.surface.observe();
        }

        let target_secs = event.position_secs();
        let deviation_secs = target_secs - observed.position_secs;
        let drifted = deviation_secs.abs() > DRIFT_THRESHOLD_SECS;
        self.stats.last_deviation_secs = Some(deviation_secs);

        debug!(
            ts_millis = event.position_millis,
            state = %event.playback,
            local_paused = observed.paused,
            local_position = observed.position_secs,
            deviation_secs,
            "authoritative event"
        );

        match (observed.paused, event.playback) {
            (true, PlaybackState::Playing) => {
                if drifted {
                    self.seek(target_secs, now, &mut actions);
                }
                self.play(now, &mut actions);
            }
            (false, PlaybackState::Paused) => {
                self.pause(now, &mut actions);
                if drifted {
                    self.seek(target_secs, now, &mut actions);
                }
            }
            _ if drifted => self.seek(target_secs, now, &mut actions),
            _ => {}
        }

        self.receipt =
            Some(ReceiptStamp::after(self.receipt.as_ref(), event, now));
        self.stats.events_applied += 1;
        actions
    }

    /// Handles a paused/playing/seeked notification from the player.
    pub fn on_surface_notification(
        &mut self,
        notification: SurfaceNotification,
    ) -> NotificationOutcome {
        let now = self.clock.now();

        if self.markers.take(SelfActionKind::matching(notification), now) {
            self.stats.notifications_suppressed += 1;
            debug!(%notification, "suppressed self-caused notification");
            return NotificationOutcome::Suppressed;
        }

        let Some(receipt) = self.receipt.as_ref() else {
            debug!(%notification, "no authoritative state yet; ignoring");
            return NotificationOutcome::Ignored;
        };
        let playback = receipt.state.playback;
        let expected_secs = receipt.expected_position_secs(now);

        let mut actions = Vec::with_capacity(1);
        match (notification, playback) {
            (SurfaceNotification::Paused, PlaybackState::Playing) => {
                info!("local pause overridden; controller is playing");
                self.play(now, &mut actions);
            }
            (SurfaceNotification::Playing, PlaybackState::Paused) => {
                info!("local play overridden; controller is paused");
                self.pause(now, &mut actions);
            }
            (SurfaceNotification::Playing, PlaybackState::Playing) => {
                debug!(expected_secs, "playback resumed; realigning position");
                self.seek(expected_secs, now, &mut actions);
            }
            (SurfaceNotification::Seeked, _) => {
                let observed = self.surface.observe();
                if (expected_secs - observed.position_secs).abs()
                    > DRIFT_THRESHOLD_SECS
                {
                    info!(
                        local_position = observed.position_secs,
                        expected_secs, "local seek overridden"
                    );
                    self.seek(expected_secs, now, &mut actions);
                }
            }
            (SurfaceNotification::Paused, PlaybackState::Paused) => {}
        }

        match actions.pop() {
            Some(action) => {
                self.stats.user_overrides += 1;
                NotificationOutcome::Corrected(action)
            }
            None => NotificationOutcome::Ignored,
        }
    }

    fn play(&mut self, now: Instant, actions: &mut Vec<CorrectiveAction>) {
        self.markers.arm(SelfActionKind::Play, now);
        self.surface.play();
        self.stats.corrective_plays += 1;
        actions.push(CorrectiveAction::Play);
    }

    fn pause(&mut self, now: Instant, actions: &mut Vec<CorrectiveAction>) {
        self.markers.arm(SelfActionKind::Pause, now);
        self.surface.pause();
        self.stats.corrective_pauses += 1;
        actions.push(CorrectiveAction::Pause);
    }

    fn seek(
        &mut self,
        position_secs: f64,
        now: Instant,
        actions: &mut Vec<CorrectiveAction>,
    ) {
        self.markers.arm(SelfActionKind::Seek, now);
        self.surface.seek(position_secs);
        self.stats.corrective_seeks += 1;
        actions.push(CorrectiveAction::Seek { position_secs });
    }
}
