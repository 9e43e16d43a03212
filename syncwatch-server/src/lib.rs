//! # Syncwatch Server
//!
//! The controller every follower obeys. It owns the authoritative playback
//! clock, accepts admin commands over HTTP (checked against the admin
//! password) and broadcasts the resulting state over a WebSocket feed.
//!
//! | method | path            | auth | effect                     |
//! |--------|-----------------|------|----------------------------|
//! | POST   | `/pause`        | yes  | pause                      |
//! | POST   | `/unpause`      | yes  | resume                     |
//! | POST   | `/seek`         | yes  | `{ new_ts_milliseconds }`  |
//! | POST   | `/change_media` | yes  | `{ new_url }`, pause at 0  |
//! | GET    | `/state`        | no   | current feed message       |
//! | GET    | `/ws`           | no   | state feed                 |

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::playback_clock::PlaybackClock;
