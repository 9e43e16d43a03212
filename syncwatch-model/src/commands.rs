#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::routes;

/// Body of [`routes::SEEK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeekRequest {
    pub new_ts_milliseconds: u64,
}

/// Body of [`routes::CHANGE_MEDIA`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeMediaRequest {
    pub new_url: String,
}

/// Commands an admin may ask the controller to apply.
///
/// The controller either accepts the command and broadcasts the resulting
/// state on the feed, or rejects it. Followers never apply these locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCommand {
    Pause,
    Unpause,
    ChangeMedia { new_url: String },
    Seek { new_ts_milliseconds: u64 },
}

/// JSON payload attached to a command, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CommandBody {
    ChangeMedia(ChangeMediaRequest),
    Seek(SeekRequest),
}

impl ControllerCommand {
    pub fn path(&self) -> &'static str {
        match self {
            ControllerCommand::Pause => routes::PAUSE,
            ControllerCommand::Unpause => routes::UNPAUSE,
            ControllerCommand::ChangeMedia { .. } => routes::CHANGE_MEDIA,
            ControllerCommand::Seek { .. } => routes::SEEK,
        }
    }

    pub fn body(&self) -> Option<CommandBody> {
        match self {
            ControllerCommand::Pause | ControllerCommand::Unpause => None,
            ControllerCommand::ChangeMedia { new_url } => {
                Some(CommandBody::ChangeMedia(ChangeMediaRequest {
                    new_url: new_url.clone(),
                }))
            }
            ControllerCommand::Seek {
                new_ts_milliseconds,
            } => Some(CommandBody::Seek(SeekRequest {
                new_ts_milliseconds: *new_ts_milliseconds,
            })),
        }
    }

    /// Short label used in logs and admin notices.
    pub fn label(&self) -> &'static str {
        match self {
            ControllerCommand::Pause => "pause",
            ControllerCommand::Unpause => "unpause",
            ControllerCommand::ChangeMedia { .. } => "change_media",
            ControllerCommand::Seek { .. } => "seek",
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn bodies_match_controller_routes() {
        let seek = ControllerCommand::Seek {
            new_ts_milliseconds: 90_000,
        };
        assert_eq!(seek.path(), "/seek");
        assert_eq!(
            serde_json::to_value(seek.body().unwrap()).unwrap(),
            serde_json::json!({ "new_ts_milliseconds": 90000 })
        );

        let change = ControllerCommand::ChangeMedia {
            new_url: "https://cdn.example/film.mp4".into(),
        };
        assert_eq!(change.path(), "/change_media");
        assert_eq!(
            serde_json::to_value(change.body().unwrap()).unwrap(),
            serde_json::json!({ "new_url": "https://cdn.example/film.mp4" })
        );
    }

    #[test]
    fn pause_and_unpause_carry_no_body() {
        assert!(ControllerCommand::Pause.body().is_none());
        assert!(ControllerCommand::Unpause.body().is_none());
        assert_eq!(ControllerCommand::Unpause.path(), "/unpause");
    }
}
