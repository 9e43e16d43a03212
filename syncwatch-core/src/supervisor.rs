//! Keeps the state feed connected.
//!
//! Policy: after any closure (graceful, broken, or a failed connect) wait a
//! fixed delay, then reconnect. No backoff, no retry cap; the controller is a
//! single long-lived trusted peer. The delay is awaited before the next
//! attempt, so a flapping controller cannot cause a reconnect storm.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::feed::{FeedConnection, StateFeed, decode_frame};
use crate::session::SessionEvent;

/// Wait between a feed closure and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Why [`ReconnectionSupervisor::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// The shutdown token fired.
    Shutdown,
    /// The session stopped receiving events.
    SessionClosed,
}

enum PumpEnd {
    Closed,
    Broken(String),
    SessionClosed,
    Shutdown,
}

/// Owns a [`StateFeed`] and forwards decoded frames to the session.
#[derive(Debug)]
pub struct ReconnectionSupervisor<F> {
    feed: F,
    events: mpsc::Sender<SessionEvent>,
    delay: Duration,
    shutdown: CancellationToken,
}

impl<F: StateFeed> ReconnectionSupervisor<F> {
    pub fn new(
        feed: F,
        events: mpsc::Sender<SessionEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            feed,
            events,
            delay: DEFAULT_RECONNECT_DELAY,
            shutdown,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Connects, pumps, and reconnects until shutdown or the session goes
    /// away.
    pub async fn run(self) -> SupervisorExit {
        let endpoint = self.feed.endpoint();
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            debug!(%endpoint, attempt, "connecting to state feed");

            let connected = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return SupervisorExit::Shutdown,
                connected = self.feed.connect() => connected,
            };

            let reason = match connected {
                Ok(connection) => {
                    let up = SessionEvent::FeedConnected {
                        endpoint: endpoint.clone(),
                    };
                    if self.events.send(up).await.is_err() {
                        return SupervisorExit::SessionClosed;
                    }

                    match self.pump(connection).await {
                        PumpEnd::Shutdown => return SupervisorExit::Shutdown,
                        PumpEnd::SessionClosed => {
                            return SupervisorExit::SessionClosed;
                        }
                        PumpEnd::Closed => {
                            "feed closed by controller".to_string()
                        }
                        PumpEnd::Broken(reason) => reason,
                    }
                }
                Err(err) => {
                    warn!(%endpoint, error = %err, "state feed connect failed");
                    err.to_string()
                }
            };

            let lost = SessionEvent::FeedLost {
                reason: reason.clone(),
            };
            if self.events.send(lost).await.is_err() {
                return SupervisorExit::SessionClosed;
            }

            info!(
                %endpoint,
                %reason,
                delay_secs = self.delay.as_secs_f64(),
                "reconnecting to state feed after delay"
            );
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return SupervisorExit::Shutdown,
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }

    async fn pump(&self, mut connection: Box<dyn FeedConnection>) -> PumpEnd {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return PumpEnd::Shutdown,
                frame = connection.next_frame() => frame,
            };

            match frame {
                None => return PumpEnd::Closed,
                Some(Err(err)) => return PumpEnd::Broken(err.to_string()),
                Some(Ok(text)) => match decode_frame(&text) {
                    Ok(state) => {
                        let event = SessionEvent::Authoritative(state);
                        if self.events.send(event).await.is_err() {
                            return PumpEnd::SessionClosed;
                        }
                    }
                    Err(err) => {
                        warn!(
                            error = %err,
                            frame = %text,
                            "dropping malformed feed frame"
                        );
                    }
                },
            }
        }
    }
}
