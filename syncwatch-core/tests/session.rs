#[path = "support/mod.rs"]
mod support;

use support::{SimulatedSurface, SurfaceCall};
use syncwatch_core::clock::ManualClock;
use syncwatch_core::reconcile::ReconciliationEngine;
use syncwatch_core::session::{SessionEvent, SyncSession, event_channel};
use syncwatch_core::surface::SurfaceNotification;
use syncwatch_model::{AuthoritativeState, PlaybackState};
use tokio_util::sync::CancellationToken;

fn session_over(
    surface: SimulatedSurface,
) -> (
    SyncSession<SimulatedSurface, ManualClock>,
    tokio::sync::mpsc::Sender<SessionEvent>,
) {
    let (tx, rx) = event_channel();
    let engine = ReconciliationEngine::with_clock(surface, ManualClock::new());
    (SyncSession::new(engine, rx, CancellationToken::new()), tx)
}

#[tokio::test]
async fn applies_events_in_arrival_order() {
    let (session, tx) = session_over(SimulatedSurface::paused_at(0.0, None));
    let snapshot = session.subscribe();
    let handle = tokio::spawn(session.run());

    tx.send(SessionEvent::FeedConnected {
        endpoint: "ws://controller/ws".into(),
    })
    .await
    .unwrap();
    tx.send(SessionEvent::Authoritative(AuthoritativeState::new(
        10_000,
        PlaybackState::Playing,
        "x.mp4",
    )))
    .await
    .unwrap();
    tx.send(SessionEvent::Authoritative(AuthoritativeState::new(
        10_000,
        PlaybackState::Paused,
        "x.mp4",
    )))
    .await
    .unwrap();
    drop(tx);

    let engine = handle.await.unwrap();
    assert_eq!(
        engine.surface().calls,
        vec![
            SurfaceCall::SetSource("x.mp4".into()),
            SurfaceCall::Seek(10.0),
            SurfaceCall::Play,
            SurfaceCall::Pause,
        ]
    );

    let snapshot = snapshot.borrow();
    assert!(snapshot.feed_connected);
    assert_eq!(snapshot.stats.events_applied, 2);
    assert_eq!(
        snapshot.last_state.as_ref().map(|s| s.playback),
        Some(PlaybackState::Paused)
    );
}

#[tokio::test]
async fn shutdown_stops_the_loop_with_senders_alive() {
    let (tx, rx) = event_channel();
    let shutdown = CancellationToken::new();
    let engine = ReconciliationEngine::with_clock(
        SimulatedSurface::paused_at(0.0, Some("x.mp4")),
        ManualClock::new(),
    );
    let session = SyncSession::new(engine, rx, shutdown.clone());
    let handle = tokio::spawn(session.run());

    shutdown.cancel();
    let engine = handle.await.unwrap();

    assert!(engine.last_state().is_none());
    drop(tx);
}

#[test]
fn dispatch_tracks_feed_health_and_overrides() {
    let (mut session, _tx) =
        session_over(SimulatedSurface::playing_at(5.0, Some("x.mp4")));
    let snapshot = session.subscribe();

    session.dispatch(SessionEvent::FeedConnected {
        endpoint: "ws://controller/ws".into(),
    });
    session.dispatch(SessionEvent::Authoritative(AuthoritativeState::new(
        5_000,
        PlaybackState::Playing,
        "x.mp4",
    )));
    assert!(session.engine().surface().calls.is_empty());

    session.dispatch(SessionEvent::Surface(SurfaceNotification::Paused));
    assert_eq!(session.engine().surface().calls, vec![SurfaceCall::Play]);
    assert_eq!(snapshot.borrow().stats.user_overrides, 1);

    session.dispatch(SessionEvent::FeedLost {
        reason: "feed closed by controller".into(),
    });
    let snapshot = snapshot.borrow();
    assert!(!snapshot.feed_connected);
    assert!(snapshot.last_state.is_some(), "state survives a lost feed");
}
