//! mpv JSON IPC framing.
//!
//! Every message is one JSON object per line. Outbound commands carry a
//! `request_id`; inbound lines are either replies (`error` + `request_id`)
//! or events (`event`). Property observers registered with
//! `observe_property` report through `property-change` events, including
//! once immediately with the current value.

use serde_json::{Value, json};
use syncwatch_core::surface::{ObservedPlayerState, SurfaceNotification};

/// Properties observed on connect, keyed by observer id. `eof-reached` is
/// registered first so its change is reported ahead of the pause mpv may
/// apply at end of file.
pub const OBSERVED_PROPERTIES: [(u64, &str); 4] = [
    (1, "eof-reached"),
    (2, "pause"),
    (3, "time-pos"),
    (4, "path"),
];

/// Wraps command arguments into an IPC request.
pub fn request(request_id: u64, args: Value) -> Value {
    json!({
        "command": args,
        "request_id": request_id,
    })
}

pub fn observe_property(id: u64, property: &str) -> Value {
    json!(["observe_property", id, property])
}

pub fn set_pause(paused: bool) -> Value {
    json!(["set_property", "pause", paused])
}

pub fn set_time_pos(position_secs: f64) -> Value {
    json!(["set_property", "time-pos", position_secs])
}

pub fn loadfile(locator: &str) -> Value {
    json!(["loadfile", locator, "replace"])
}

/// What an inbound line means to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpvEvent {
    /// Forwarded to the session as a player notification.
    Notify(SurfaceNotification),
    /// The file requested by `loadfile` is open and accepts seeks.
    FileLoaded,
    /// The requested file could not be opened.
    LoadFailed,
}

/// Folds inbound IPC lines into the cached player state and reports the
/// notifications an HTML media element would have fired.
#[derive(Debug, Default)]
pub struct MpvTracker {
    seeking: bool,
    at_eof: bool,
}

impl MpvTracker {
    pub fn apply(
        &mut self,
        line: &str,
        state: &mut ObservedPlayerState,
    ) -> Option<MpvEvent> {
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(err) => {
                log::warn!("Ignoring unparseable mpv IPC line: {}", err);
                return None;
            }
        };

        if let Some(error) = message["error"].as_str() {
            if error != "success" {
                log::warn!(
                    "mpv rejected request {}: {}",
                    message["request_id"],
                    error
                );
            }
            return None;
        }

        match message["event"].as_str()? {
            "property-change" => self
                .property_change(&message, state)
                .map(MpvEvent::Notify),
            "seek" => {
                self.seeking = true;
                None
            }
            "playback-restart" if self.seeking => {
                self.seeking = false;
                Some(MpvEvent::Notify(SurfaceNotification::Seeked))
            }
            "file-loaded" => Some(MpvEvent::FileLoaded),
            "end-file" if message["reason"] == "error" => {
                log::warn!(
                    "mpv could not open file: {}",
                    message["file_error"]
                );
                Some(MpvEvent::LoadFailed)
            }
            "end-file" => {
                log::debug!("mpv finished file: {}", message["reason"]);
                None
            }
            _ => None,
        }
    }

    fn property_change(
        &mut self,
        message: &Value,
        state: &mut ObservedPlayerState,
    ) -> Option<SurfaceNotification> {
        let data = &message["data"];
        match message["name"].as_str()? {
            // Unavailable (null) while no file is open.
            "eof-reached" => {
                self.at_eof = data.as_bool().unwrap_or(false);
                None
            }
            "pause" => {
                let paused = data.as_bool()?;
                state.paused = paused;
                if paused && self.at_eof {
                    log::debug!("mpv paused at end of file; not reporting");
                    return None;
                }
                Some(if paused {
                    SurfaceNotification::Paused
                } else {
                    SurfaceNotification::Playing
                })
            }
            "time-pos" => {
                if let Some(position) = data.as_f64() {
                    state.position_secs = position;
                }
                None
            }
            // `path` goes null between files during `loadfile replace`;
            // keep the last known locator.
            "path" => {
                if let Some(path) = data.as_str() {
                    state.source_locator = Some(path.to_string());
                }
                None
            }
            _ => None,
        }
    }
}
