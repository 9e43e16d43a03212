//! Test doubles for the core seams.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use syncwatch_core::clock::Clock;
use syncwatch_core::commands::{CommandChannel, CredentialStore};
use syncwatch_core::error::{CommandError, FeedError};
use syncwatch_core::feed::{FeedConnection, StateFeed};
use syncwatch_core::reconcile::ReconciliationEngine;
use syncwatch_core::surface::{
    MediaSurface, ObservedPlayerState, SurfaceNotification,
};
use syncwatch_model::ControllerCommand;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    SetSource(String),
    Play,
    Pause,
    Seek(f64),
}

/// Player double with HTML media element semantics: flag changes and seeks
/// queue a notification, loading a source rewinds and pauses.
#[derive(Debug, Clone)]
pub struct SimulatedSurface {
    pub position_secs: f64,
    pub paused: bool,
    pub source: Option<String>,
    pub calls: Vec<SurfaceCall>,
    pub pending: VecDeque<SurfaceNotification>,
}

impl SimulatedSurface {
    pub fn paused_at(position_secs: f64, source: Option<&str>) -> Self {
        Self {
            position_secs,
            paused: true,
            source: source.map(str::to_string),
            calls: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn playing_at(position_secs: f64, source: Option<&str>) -> Self {
        Self {
            paused: false,
            ..Self::paused_at(position_secs, source)
        }
    }

    /// Simulates the user hitting pause; returns the notification emitted.
    pub fn user_pause(&mut self) -> SurfaceNotification {
        self.paused = true;
        SurfaceNotification::Paused
    }

    pub fn user_play(&mut self) -> SurfaceNotification {
        self.paused = false;
        SurfaceNotification::Playing
    }

    pub fn user_seek(&mut self, position_secs: f64) -> SurfaceNotification {
        self.position_secs = position_secs;
        SurfaceNotification::Seeked
    }

    pub fn take_notifications(&mut self) -> Vec<SurfaceNotification> {
        self.pending.drain(..).collect()
    }
}

impl MediaSurface for SimulatedSurface {
    fn observe(&self) -> ObservedPlayerState {
        ObservedPlayerState {
            position_secs: self.position_secs,
            paused: self.paused,
            source_locator: self.source.clone(),
        }
    }

    fn set_source(&mut self, locator: &str) {
        self.calls.push(SurfaceCall::SetSource(locator.to_string()));
        self.source = Some(locator.to_string());
        self.position_secs = 0.0;
        if !self.paused {
            self.paused = true;
            self.pending.push_back(SurfaceNotification::Paused);
        }
    }

    fn play(&mut self) {
        self.calls.push(SurfaceCall::Play);
        if self.paused {
            self.paused = false;
            self.pending.push_back(SurfaceNotification::Playing);
        }
    }

    fn pause(&mut self) {
        self.calls.push(SurfaceCall::Pause);
        if !self.paused {
            self.paused = true;
            self.pending.push_back(SurfaceNotification::Paused);
        }
    }

    fn seek(&mut self, position_secs: f64) {
        self.calls.push(SurfaceCall::Seek(position_secs));
        self.position_secs = position_secs;
        self.pending.push_back(SurfaceNotification::Seeked);
    }
}

/// Feeds every queued player notification back into the engine until the
/// player goes quiet. Panics if it never does.
pub fn settle<C: Clock>(
    engine: &mut ReconciliationEngine<SimulatedSurface, C>,
) {
    for _ in 0..32 {
        let notifications = engine.surface_mut().take_notifications();
        if notifications.is_empty() {
            return;
        }
        for notification in notifications {
            engine.on_surface_notification(notification);
        }
    }
    panic!("player notifications never settled: feedback loop");
}

/// One scripted connection: frames to yield, then how it ends.
#[derive(Debug, Clone)]
pub enum ScriptedConnection {
    Frames {
        frames: Vec<String>,
        ends_with_error: bool,
    },
    Refused,
}

impl ScriptedConnection {
    pub fn closing_after(frames: &[&str]) -> Self {
        ScriptedConnection::Frames {
            frames: frames.iter().map(|f| f.to_string()).collect(),
            ends_with_error: false,
        }
    }

    pub fn breaking_after(frames: &[&str]) -> Self {
        ScriptedConnection::Frames {
            frames: frames.iter().map(|f| f.to_string()).collect(),
            ends_with_error: true,
        }
    }
}

/// Feed that replays scripted connections, then keeps closing immediately.
/// Records the (tokio) time of every connect attempt.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeed {
    scripts: Arc<Mutex<VecDeque<ScriptedConnection>>>,
    pub attempts: Arc<Mutex<Vec<tokio::time::Instant>>>,
}

impl ScriptedFeed {
    pub fn new(scripts: Vec<ScriptedConnection>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            attempts: Arc::default(),
        }
    }

    pub fn attempt_times(&self) -> Vec<tokio::time::Instant> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl StateFeed for ScriptedFeed {
    fn endpoint(&self) -> String {
        "scripted://controller".to_string()
    }

    async fn connect(&self) -> Result<Box<dyn FeedConnection>, FeedError> {
        self.attempts.lock().push(tokio::time::Instant::now());
        let script = self
            .scripts
            .lock()
            .pop_front()
            .unwrap_or_else(|| ScriptedConnection::closing_after(&[]));

        match script {
            ScriptedConnection::Refused => Err(FeedError::Connect {
                endpoint: self.endpoint(),
                source: "connection refused".into(),
            }),
            ScriptedConnection::Frames {
                frames,
                ends_with_error,
            } => Ok(Box::new(ScriptedFrames {
                frames: frames.into(),
                ends_with_error,
            })),
        }
    }
}

struct ScriptedFrames {
    frames: VecDeque<String>,
    ends_with_error: bool,
}

#[async_trait]
impl FeedConnection for ScriptedFrames {
    async fn next_frame(&mut self) -> Option<Result<String, FeedError>> {
        match self.frames.pop_front() {
            Some(frame) => Some(Ok(frame)),
            None if self.ends_with_error => {
                self.ends_with_error = false;
                Some(Err(FeedError::Transport("connection reset".into())))
            }
            None => None,
        }
    }
}

/// What [`RecordingChannel`] saw for each command.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedCommand {
    pub command: ControllerCommand,
    pub credential: Option<String>,
}

/// Command channel double; optionally rejects with a fixed status.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    credentials: CredentialStore,
    reject_with: Option<u16>,
    pub issued: Arc<Mutex<Vec<IssuedCommand>>>,
}

impl RecordingChannel {
    pub fn new(credentials: CredentialStore) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    pub fn rejecting(credentials: CredentialStore, status: u16) -> Self {
        Self {
            credentials,
            reject_with: Some(status),
            ..Self::default()
        }
    }

    pub fn issued(&self) -> Vec<IssuedCommand> {
        self.issued.lock().clone()
    }
}

#[async_trait]
impl CommandChannel for RecordingChannel {
    async fn issue(
        &self,
        command: &ControllerCommand,
    ) -> Result<(), CommandError> {
        self.issued.lock().push(IssuedCommand {
            command: command.clone(),
            credential: self.credentials.current(),
        });
        match self.reject_with {
            Some(status) => Err(CommandError::Rejected {
                command: command.label(),
                status,
                reason: "Unauthorized".to_string(),
            }),
            None => Ok(()),
        }
    }
}
