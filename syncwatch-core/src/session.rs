//! Single-threaded dispatch into the reconciliation engine.
//!
//! Feed frames and player notifications arrive from separate tasks but all
//! funnel into one channel. [`SyncSession::run`] applies each event to the
//! engine to completion before receiving the next, so the engine is never
//! re-entered and needs no locking.

use syncwatch_model::AuthoritativeState;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::reconcile::{EngineStats, ReconciliationEngine};
use crate::surface::{MediaSurface, SurfaceNotification};

/// Capacity used by [`event_channel`].
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Inputs to the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Authoritative(AuthoritativeState),
    Surface(SurfaceNotification),
    FeedConnected { endpoint: String },
    FeedLost { reason: String },
}

/// Read-only view published after every dispatched event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub feed_connected: bool,
    pub last_state: Option<AuthoritativeState>,
    pub expected_position_secs: Option<f64>,
    pub stats: EngineStats,
}

pub fn event_channel()
-> (mpsc::Sender<SessionEvent>, mpsc::Receiver<SessionEvent>) {
    mpsc::channel(DEFAULT_EVENT_CAPACITY)
}

/// Owns the engine and the receiving end of the event channel.
#[derive(Debug)]
pub struct SyncSession<S, C = SystemClock> {
    engine: ReconciliationEngine<S, C>,
    events: mpsc::Receiver<SessionEvent>,
    snapshot: watch::Sender<SessionSnapshot>,
    feed_connected: bool,
    shutdown: CancellationToken,
}

impl<S: MediaSurface, C: Clock> SyncSession<S, C> {
    pub fn new(
        engine: ReconciliationEngine<S, C>,
        events: mpsc::Receiver<SessionEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());
        Self {
            engine,
            events,
            snapshot,
            feed_connected: false,
            shutdown,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn engine(&self) -> &ReconciliationEngine<S, C> {
        &self.engine
    }

    /// Runs until every sender is dropped or shutdown is requested, then
    /// hands the engine back.
    pub async fn run(mut self) -> ReconciliationEngine<S, C> {
        info!("sync session started");
        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("sync session shutting down");
                    break;
                }
                event = self.events.recv() => event,
            };

            match event {
                Some(event) => self.dispatch(event),
                None => {
                    info!("all event sources closed; sync session ending");
                    break;
                }
            }
        }
        self.engine
    }

    /// Applies a single event. Public so callers can drive the session
    /// without a runtime.
    pub fn dispatch(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Authoritative(state) => {
                let actions = self.engine.on_authoritative_event(state);
                if !actions.is_empty() {
                    debug!(?actions, "corrective actions issued");
                }
            }
            SessionEvent::Surface(notification) => {
                let outcome = self.engine.on_surface_notification(notification);
                debug!(%notification, ?outcome, "player notification handled");
            }
            SessionEvent::FeedConnected { endpoint } => {
                info!(%endpoint, "state feed connected");
                self.feed_connected = true;
            }
            SessionEvent::FeedLost { reason } => {
                warn!(%reason, "state feed lost");
                self.feed_connected = false;
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshot.send_replace(SessionSnapshot {
            feed_connected: self.feed_connected,
            last_state: self.engine.last_state().cloned(),
            expected_position_secs: self.engine.expected_position_secs(),
            stats: self.engine.stats().clone(),
        });
    }
}
