//! External mpv process driven over JSON IPC.
//!
//! [`MpvProcess`] owns the child process. [`MpvSurface`] is the engine's
//! view of it: commands are queued to a writer task and never block, reads
//! come from a state cache the reader task keeps current, and every pause or
//! seek notification is forwarded to the session channel.
//!
//! `loadfile` returns before the file is open, so a seek issued while a load
//! is in flight is held back and sent once mpv reports `file-loaded`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use syncwatch_config::PlayerConfig;
use syncwatch_core::error::SurfaceError;
use syncwatch_core::session::SessionEvent;
use syncwatch_core::surface::{MediaSurface, ObservedPlayerState};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::mpv_ipc::{self, MpvEvent, MpvTracker, OBSERVED_PROPERTIES};

const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to the spawned mpv process.
#[derive(Debug)]
pub struct MpvProcess {
    child: Child,
    socket_path: PathBuf,
}

impl MpvProcess {
    /// Starts mpv idle and paused, listening on the configured IPC socket.
    ///
    /// The last frame is kept at end of file without pausing, so reaching
    /// the end never looks like a local pause.
    pub fn spawn(config: &PlayerConfig) -> Result<Self, SurfaceError> {
        let socket_path = config.ipc_socket.clone();
        // A stale socket from a previous run would accept nothing.
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new(&config.mpv_path);
        cmd.arg(format!("--input-ipc-server={}", socket_path.display()))
            .arg("--idle=yes")
            .arg("--force-window=yes")
            .arg("--keep-open=yes")
            .arg("--keep-open-pause=no")
            .arg("--pause")
            .arg("--osd-level=1")
            .args(&config.extra_args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        log::info!(
            "Spawning mpv ({}) with IPC socket {}",
            config.mpv_path,
            socket_path.display()
        );
        let child = cmd.spawn().map_err(|err| {
            SurfaceError::Unavailable(format!(
                "could not start `{}`: {}",
                config.mpv_path, err
            ))
        })?;

        Ok(Self { child, socket_path })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Resolves when mpv exits.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }
}

impl Drop for MpvProcess {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Outbound IPC commands, shared by the surface and the reader task.
#[derive(Debug, Clone)]
struct CommandQueue {
    outbound: mpsc::UnboundedSender<Value>,
    next_id: Arc<AtomicU64>,
}

impl CommandQueue {
    fn send(&self, args: Value) {
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = mpv_ipc::request(request_id, args);
        if self.outbound.send(request).is_err() {
            log::warn!("mpv IPC writer is gone; dropping command");
        }
    }
}

/// Load bookkeeping shared with the reader task.
#[derive(Debug, Default)]
struct PendingLoad {
    loading: bool,
    seek_secs: Option<f64>,
}

/// [`MediaSurface`] backed by an mpv IPC connection.
#[derive(Debug)]
pub struct MpvSurface {
    commands: CommandQueue,
    state: Arc<Mutex<ObservedPlayerState>>,
    load: Arc<Mutex<PendingLoad>>,
}

impl MpvSurface {
    /// Connects to mpv's IPC socket, retrying while mpv creates it.
    ///
    /// Player notifications are sent to `events`. When the connection closes
    /// `player_gone` is cancelled.
    pub async fn connect(
        socket_path: &Path,
        events: mpsc::Sender<SessionEvent>,
        player_gone: CancellationToken,
    ) -> Result<Self, SurfaceError> {
        let stream = connect_with_retry(socket_path).await?;
        Ok(Self::from_stream(stream, events, player_gone))
    }

    /// Wraps an already connected IPC stream and starts its reader and
    /// writer tasks. Must be called inside a tokio runtime.
    pub fn from_stream(
        stream: UnixStream,
        events: mpsc::Sender<SessionEvent>,
        player_gone: CancellationToken,
    ) -> Self {
        let (reader, writer) = stream.into_split();
        let (outbound, queued) = mpsc::unbounded_channel();
        let commands = CommandQueue {
            outbound,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        let state = Arc::new(Mutex::new(ObservedPlayerState {
            paused: true,
            ..ObservedPlayerState::default()
        }));
        let load = Arc::new(Mutex::new(PendingLoad::default()));

        tokio::spawn(write_commands(writer, queued));
        tokio::spawn(read_events(
            reader,
            EventTargets {
                state: Arc::clone(&state),
                load: Arc::clone(&load),
                commands: commands.clone(),
                events,
            },
            player_gone,
        ));

        for (id, property) in OBSERVED_PROPERTIES {
            commands.send(mpv_ipc::observe_property(id, property));
        }
        Self {
            commands,
            state,
            load,
        }
    }
}

impl MediaSurface for MpvSurface {
    fn observe(&self) -> ObservedPlayerState {
        self.state.lock().clone()
    }

    fn set_source(&mut self, locator: &str) {
        log::info!("Loading {} into mpv", locator);
        {
            let mut state = self.state.lock();
            state.source_locator = Some(locator.to_string());
            state.position_secs = 0.0;
        }
        let mut load = self.load.lock();
        load.loading = true;
        load.seek_secs = None;
        self.commands.send(mpv_ipc::loadfile(locator));
    }

    fn play(&mut self) {
        self.state.lock().paused = false;
        self.commands.send(mpv_ipc::set_pause(false));
    }

    fn pause(&mut self) {
        self.state.lock().paused = true;
        self.commands.send(mpv_ipc::set_pause(true));
    }

    fn seek(&mut self, position_secs: f64) {
        let position_secs = position_secs.max(0.0);
        self.state.lock().position_secs = position_secs;

        let mut load = self.load.lock();
        if load.loading {
            log::debug!(
                "Holding seek to {:.3}s until mpv has loaded the file",
                position_secs
            );
            load.seek_secs = Some(position_secs);
        } else {
            self.commands.send(mpv_ipc::set_time_pos(position_secs));
        }
    }
}

async fn connect_with_retry(
    socket_path: &Path,
) -> Result<UnixStream, SurfaceError> {
    let mut last_err = None;
    for _ in 0..CONNECT_ATTEMPTS {
        match UnixStream::connect(socket_path).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                last_err = Some(err);
                tokio::time::sleep(CONNECT_INTERVAL).await;
            }
        }
    }
    Err(SurfaceError::Unavailable(format!(
        "mpv IPC socket {} never came up: {}",
        socket_path.display(),
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

async fn write_commands(
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<Value>,
) {
    while let Some(command) = outbound.recv().await {
        let mut line = command.to_string();
        line.push('\n');
        if let Err(err) = writer.write_all(line.as_bytes()).await {
            log::warn!("Failed to write to mpv IPC: {}", err);
            break;
        }
    }
}

/// Everything the reader task writes to.
struct EventTargets {
    state: Arc<Mutex<ObservedPlayerState>>,
    load: Arc<Mutex<PendingLoad>>,
    commands: CommandQueue,
    events: mpsc::Sender<SessionEvent>,
}

impl EventTargets {
    fn file_loaded(&self) {
        let mut load = self.load.lock();
        load.loading = false;
        if let Some(position_secs) = load.seek_secs.take() {
            log::debug!("Sending held seek to {:.3}s", position_secs);
            self.commands.send(mpv_ipc::set_time_pos(position_secs));
        }
    }

    fn load_failed(&self) {
        let mut load = self.load.lock();
        load.loading = false;
        if let Some(position_secs) = load.seek_secs.take() {
            log::warn!(
                "Dropping held seek to {:.3}s; the file did not load",
                position_secs
            );
        }
    }
}

async fn read_events(
    reader: OwnedReadHalf,
    targets: EventTargets,
    player_gone: CancellationToken,
) {
    let mut lines = BufReader::new(reader).lines();
    let mut tracker = MpvTracker::default();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                log::info!("mpv IPC connection closed");
                break;
            }
            Err(err) => {
                log::warn!("mpv IPC read failed: {}", err);
                break;
            }
        };

        let event = tracker.apply(&line, &mut targets.state.lock());
        match event {
            Some(MpvEvent::Notify(notification)) => {
                let event = SessionEvent::Surface(notification);
                if targets.events.send(event).await.is_err() {
                    log::debug!("Session closed; stopping mpv reader");
                    return;
                }
            }
            Some(MpvEvent::FileLoaded) => targets.file_loaded(),
            Some(MpvEvent::LoadFailed) => targets.load_failed(),
            None => {}
        }
    }

    player_gone.cancel();
}
