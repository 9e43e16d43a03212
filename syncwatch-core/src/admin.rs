//! Admin console: turns typed lines into controller commands.
//!
//! ```text
//! pause                 ask the controller to pause
//! play | unpause        ask the controller to resume
//! url <locator>         ask the controller to switch media
//! seek <secs | mm:ss>   ask the controller to seek
//! password <secret>     set the credential sent with commands
//! status                show the follower's view of the session
//! ```

use syncwatch_model::{ControllerCommand, ModelError, parse_seek_input};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::commands::{CommandChannel, CredentialStore};
use crate::session::SessionSnapshot;

pub const HELP: &str = "\
commands:
  pause                 ask the controller to pause
  play | unpause        ask the controller to resume
  url <locator>         ask the controller to switch media
  seek <secs | mm:ss>   ask the controller to seek
  password <secret>     set the credential sent with commands
  status                show the follower's view of the session
  help                  show this text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    Issue(ControllerCommand),
    SetCredential(String),
    Status,
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminInputError {
    #[error("empty input")]
    Empty,

    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),

    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("seek dropped: {0}")]
    Seek(#[from] ModelError),
}

/// Parses one console line.
pub fn parse_admin_line(line: &str) -> Result<AdminAction, AdminInputError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "" => Err(AdminInputError::Empty),
        "pause" => Ok(AdminAction::Issue(ControllerCommand::Pause)),
        "play" | "unpause" | "resume" => {
            Ok(AdminAction::Issue(ControllerCommand::Unpause))
        }
        "url" | "media" => {
            if rest.is_empty() {
                return Err(AdminInputError::MissingArgument {
                    command: "url",
                    what: "a media locator",
                });
            }
            Ok(AdminAction::Issue(ControllerCommand::ChangeMedia {
                new_url: rest.to_string(),
            }))
        }
        "seek" => {
            let new_ts_milliseconds = parse_seek_input(rest)?;
            Ok(AdminAction::Issue(ControllerCommand::Seek {
                new_ts_milliseconds,
            }))
        }
        "password" | "pw" => {
            if rest.is_empty() {
                return Err(AdminInputError::MissingArgument {
                    command: "password",
                    what: "a secret",
                });
            }
            Ok(AdminAction::SetCredential(rest.to_string()))
        }
        "status" => Ok(AdminAction::Status),
        "help" | "?" => Ok(AdminAction::Help),
        other => Err(AdminInputError::Unknown(other.to_string())),
    }
}

/// A line of feedback for the admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Failure(String),
}

impl Notice {
    pub fn is_failure(&self) -> bool {
        matches!(self, Notice::Failure(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Failure(text) => text,
        }
    }
}

/// Executes parsed admin lines against a [`CommandChannel`].
#[derive(Debug)]
pub struct AdminConsole<C> {
    channel: C,
    credentials: CredentialStore,
    snapshot: Option<watch::Receiver<SessionSnapshot>>,
}

impl<C: CommandChannel> AdminConsole<C> {
    pub fn new(channel: C, credentials: CredentialStore) -> Self {
        Self {
            channel,
            credentials,
            snapshot: None,
        }
    }

    pub fn with_snapshot(
        mut self,
        snapshot: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Handles one typed line. Blank lines produce no notice.
    pub async fn handle_line(&self, line: &str) -> Option<Notice> {
        let action = match parse_admin_line(line) {
            Ok(action) => action,
            Err(AdminInputError::Empty) => return None,
            Err(err) => return Some(Notice::Failure(err.to_string())),
        };

        let notice = match action {
            AdminAction::Issue(command) => self.issue(command).await,
            AdminAction::SetCredential(secret) => {
                self.credentials.set(secret);
                Notice::Info("credential updated".to_string())
            }
            AdminAction::Status => Notice::Info(self.render_status()),
            AdminAction::Help => Notice::Info(HELP.to_string()),
        };
        Some(notice)
    }

    async fn issue(&self, command: ControllerCommand) -> Notice {
        match self.channel.issue(&command).await {
            Ok(()) => {
                info!(command = command.label(), "controller accepted command");
                Notice::Info(format!("{} sent", command.label()))
            }
            Err(err) => {
                warn!(
                    command = command.label(),
                    error = %err,
                    "command failed"
                );
                Notice::Failure(err.to_string())
            }
        }
    }

    fn render_status(&self) -> String {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return "no session attached".to_string();
        };
        let snapshot = snapshot.borrow();

        let feed = if snapshot.feed_connected {
            "connected"
        } else {
            "disconnected"
        };
        let Some(state) = snapshot.last_state.as_ref() else {
            return format!("feed {feed}; no authoritative state yet");
        };

        let expected = snapshot
            .expected_position_secs
            .unwrap_or_else(|| state.position_secs());
        let deviation = snapshot
            .stats
            .last_deviation_secs
            .map(|d| format!("{d:+.2}s"))
            .unwrap_or_else(|| "n/a".to_string());
        let media = if state.media_locator.is_empty() {
            "<none>"
        } else {
            state.media_locator.as_str()
        };

        format!(
            "feed {feed}; {} at {:.1}s (now ~{expected:.1}s); media {media}; \
             last deviation {deviation}; seeks {}, overrides {}",
            state.playback,
            state.position_secs(),
            snapshot.stats.corrective_seeks,
            snapshot.stats.user_overrides,
        )
    }
}
