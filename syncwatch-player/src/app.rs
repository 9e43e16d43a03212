//! Follower wiring: mpv, the sync session, the state feed supervisor and
//! the admin console, all stopped by one shutdown token.

use anyhow::Context;
use syncwatch_config::Config;
use syncwatch_core::admin::AdminConsole;
use syncwatch_core::commands::CredentialStore;
use syncwatch_core::session::event_channel;
use syncwatch_core::{ReconciliationEngine, ReconnectionSupervisor, SyncSession};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

use crate::domains::player::{MpvProcess, MpvSurface};
use crate::infrastructure::console::run_console;
use crate::infrastructure::{HttpCommandChannel, WebSocketFeed};

/// Runtime switches that are not part of [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub console: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { console: true }
    }
}

/// Runs the follower until ctrl-c or until mpv goes away.
pub async fn run(config: Config, options: RunOptions) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let player_gone = CancellationToken::new();
    let (events_tx, events_rx) = event_channel();

    let mut mpv = MpvProcess::spawn(&config.player)
        .context("failed to start the media player")?;
    let surface = MpvSurface::connect(
        mpv.socket_path(),
        events_tx.clone(),
        player_gone.clone(),
    )
    .await
    .context("failed to attach to the media player")?;

    let engine = ReconciliationEngine::new(surface)
        .with_self_action_timeout(config.sync.self_action_timeout);
    let session = SyncSession::new(engine, events_rx, shutdown.clone());
    let snapshot = session.subscribe();

    let supervisor = ReconnectionSupervisor::new(
        WebSocketFeed::new(config.controller.feed_url.clone()),
        events_tx,
        shutdown.clone(),
    )
    .with_delay(config.sync.reconnect_delay);

    let credentials =
        CredentialStore::new(config.controller.credential.clone());
    let channel = HttpCommandChannel::new(
        config.controller.base_url.clone(),
        credentials.clone(),
        config.controller.request_timeout,
    )
    .context("failed to build the controller HTTP client")?;
    let console =
        AdminConsole::new(channel, credentials).with_snapshot(snapshot);

    log::info!(
        "Following {} (commands to {})",
        config.controller.feed_url,
        config.controller.base_url
    );

    let session_task = tokio::spawn(session.run());
    let supervisor_task = tokio::spawn(supervisor.run());
    let console_task = options.console.then(|| {
        tokio::spawn(run_console(
            console,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown.clone(),
        ))
    });

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            log::info!("Interrupted; shutting down");
        }
        status = mpv.wait() => match status {
            Ok(status) => log::info!("mpv exited ({}); shutting down", status),
            Err(err) => log::warn!("Lost track of mpv: {}; shutting down", err),
        },
        _ = player_gone.cancelled() => {
            log::info!("mpv IPC connection closed; shutting down");
        }
    }

    shutdown.cancel();

    match supervisor_task.await {
        Ok(exit) => log::debug!("State feed supervisor stopped: {:?}", exit),
        Err(err) => log::error!("State feed supervisor panicked: {}", err),
    }
    match session_task.await {
        Ok(engine) => log::debug!("Sync session stopped: {:?}", engine.stats()),
        Err(err) => log::error!("Sync session panicked: {}", err),
    }
    if let Some(task) = console_task {
        // Stdin reads cannot be interrupted; don't wait on them.
        if task.is_finished() {
            if let Ok(Err(err)) = task.await {
                log::warn!("Admin console failed: {}", err);
            }
        } else {
            task.abort();
        }
    }

    drop(mpv);
    Ok(())
}
