//! Wire models shared between the Syncwatch controller and its followers.
#![allow(missing_docs)]

pub mod commands;
pub mod error;
pub mod feed;
pub mod playback;
pub mod routes;
pub mod seek_input;

// Intentionally curated re-exports for downstream consumers.
pub use commands::{ChangeMediaRequest, ControllerCommand, SeekRequest};
pub use error::{ModelError, Result as ModelResult};
pub use feed::StateFeedMessage;
pub use playback::{AuthoritativeState, PlaybackState};
pub use seek_input::parse_seek_input;
