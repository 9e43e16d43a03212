#[path = "support/mod.rs"]
mod support;

use std::time::Duration;

use support::{ScriptedConnection, ScriptedFeed};
use syncwatch_core::session::{SessionEvent, event_channel};
use syncwatch_core::supervisor::{
    DEFAULT_RECONNECT_DELAY, ReconnectionSupervisor, SupervisorExit,
};
use syncwatch_model::{AuthoritativeState, PlaybackState};
use tokio_util::sync::CancellationToken;

const PLAYING_FRAME: &str =
    r#"{"ts_millis":10000,"state":"Playing","media_url":"x.mp4"}"#;
const PAUSED_FRAME: &str =
    r#"{"ts_millis":12000,"state":"Paused","media_url":"x.mp4"}"#;

#[tokio::test(start_paused = true)]
async fn reconnects_after_every_closure_with_fixed_delay() {
    let feed = ScriptedFeed::new(vec![
        ScriptedConnection::closing_after(&[PLAYING_FRAME]),
        ScriptedConnection::Refused,
        ScriptedConnection::breaking_after(&[]),
    ]);
    let (tx, mut rx) = event_channel();
    let shutdown = CancellationToken::new();
    let supervisor =
        ReconnectionSupervisor::new(feed.clone(), tx, shutdown.clone());
    assert_eq!(supervisor.delay(), DEFAULT_RECONNECT_DELAY);
    let handle = tokio::spawn(supervisor.run());

    let mut losses = 0;
    while losses < 5 {
        match rx.recv().await {
            Some(SessionEvent::FeedLost { .. }) => losses += 1,
            Some(_) => {}
            None => panic!("supervisor dropped its sender"),
        }
    }
    shutdown.cancel();
    assert_eq!(handle.await.unwrap(), SupervisorExit::Shutdown);

    let attempts = feed.attempt_times();
    assert!(attempts.len() >= 5, "attempts: {}", attempts.len());
    for pair in attempts.windows(2) {
        assert!(
            pair[1] - pair[0] >= DEFAULT_RECONNECT_DELAY,
            "reconnected after {:?}",
            pair[1] - pair[0]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn forwards_frames_and_drops_malformed_ones() {
    let feed = ScriptedFeed::new(vec![ScriptedConnection::breaking_after(&[
        PLAYING_FRAME,
        "{not json",
        r#"{"ts_millis":-5,"state":"Paused","media_url":""}"#,
        PAUSED_FRAME,
    ])]);
    let (tx, mut rx) = event_channel();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(
        ReconnectionSupervisor::new(feed, tx, shutdown.clone()).run(),
    );

    let mut seen = Vec::new();
    loop {
        let event = rx.recv().await.expect("supervisor alive");
        let lost = matches!(event, SessionEvent::FeedLost { .. });
        seen.push(event);
        if lost {
            break;
        }
    }
    shutdown.cancel();
    handle.await.unwrap();

    assert!(matches!(seen[0], SessionEvent::FeedConnected { .. }));
    assert_eq!(
        seen[1],
        SessionEvent::Authoritative(AuthoritativeState::new(
            10_000,
            PlaybackState::Playing,
            "x.mp4"
        ))
    );
    assert_eq!(
        seen[2],
        SessionEvent::Authoritative(AuthoritativeState::new(
            12_000,
            PlaybackState::Paused,
            "x.mp4"
        ))
    );
    assert!(matches!(seen[3], SessionEvent::FeedLost { .. }));
    assert_eq!(seen.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_the_reconnect_wait() {
    let feed = ScriptedFeed::new(vec![ScriptedConnection::Refused]);
    let (tx, mut rx) = event_channel();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(
        ReconnectionSupervisor::new(feed.clone(), tx, shutdown.clone())
            .with_delay(Duration::from_secs(60))
            .run(),
    );

    assert!(matches!(
        rx.recv().await,
        Some(SessionEvent::FeedLost { .. })
    ));
    let started = tokio::time::Instant::now();
    shutdown.cancel();

    assert_eq!(handle.await.unwrap(), SupervisorExit::Shutdown);
    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(feed.attempt_times().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stops_when_the_session_goes_away() {
    let feed = ScriptedFeed::new(vec![ScriptedConnection::closing_after(&[
        PLAYING_FRAME,
    ])]);
    let (tx, rx) = event_channel();
    drop(rx);

    let exit = ReconnectionSupervisor::new(feed, tx, CancellationToken::new())
        .run()
        .await;

    assert_eq!(exit, SupervisorExit::SessionClosed);
}
