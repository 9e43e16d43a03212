#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::playback::{AuthoritativeState, PlaybackState};

/// One state-feed frame, exactly as it travels over the wire.
///
/// ```json
/// { "ts_millis": 10000, "state": "Playing", "media_url": "x.mp4" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateFeedMessage {
    pub ts_millis: u64,
    pub state: PlaybackState,
    pub media_url: String,
}

impl From<StateFeedMessage> for AuthoritativeState {
    fn from(message: StateFeedMessage) -> Self {
        AuthoritativeState {
            position_millis: message.ts_millis,
            playback: message.state,
            media_locator: message.media_url,
        }
    }
}

impl From<&AuthoritativeState> for StateFeedMessage {
    fn from(state: &AuthoritativeState) -> Self {
        StateFeedMessage {
            ts_millis: state.position_millis,
            state: state.playback,
            media_url: state.media_locator.clone(),
        }
    }
}
