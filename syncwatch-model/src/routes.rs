//! Route definitions shared by the controller and its followers.

pub const PAUSE: &str = "/pause";
pub const UNPAUSE: &str = "/unpause";
pub const CHANGE_MEDIA: &str = "/change_media";
pub const SEEK: &str = "/seek";

/// Read-only snapshot of the current authoritative state.
pub const STATE: &str = "/state";

/// WebSocket upgrade for the state feed.
pub const FEED: &str = "/ws";
