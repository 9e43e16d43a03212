//! State feed seam.
//!
//! A feed yields text frames, one per authoritative change, until it closes.
//! Transports (WebSocket, test scripts) implement [`StateFeed`]; decoding and
//! reconnect policy stay in the core.

use async_trait::async_trait;
use syncwatch_model::{AuthoritativeState, StateFeedMessage};

use crate::error::FeedError;

/// Something that can (re)open the controller's state feed.
#[async_trait]
pub trait StateFeed: Send + Sync {
    /// Human readable endpoint, used in logs.
    fn endpoint(&self) -> String;

    async fn connect(&self) -> Result<Box<dyn FeedConnection>, FeedError>;
}

/// One live feed connection.
#[async_trait]
pub trait FeedConnection: Send {
    /// Next text frame. `None` once the connection closed gracefully;
    /// `Some(Err(_))` when it broke.
    async fn next_frame(&mut self) -> Option<Result<String, FeedError>>;
}

/// Decodes one feed frame into the engine's state type.
pub fn decode_frame(frame: &str) -> Result<AuthoritativeState, FeedError> {
    let message: StateFeedMessage = serde_json::from_str(frame)?;
    Ok(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncwatch_model::PlaybackState;

    #[test]
    fn decodes_wire_frame() {
        let state = decode_frame(
            r#"{"ts_millis":2500,"state":"Paused","media_url":"a.mkv"}"#,
        )
        .unwrap();

        assert_eq!(
            state,
            AuthoritativeState::new(2500, PlaybackState::Paused, "a.mkv")
        );
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(matches!(
            decode_frame("not json"),
            Err(FeedError::Malformed(_))
        ));
        let wrong_type =
            r#"{"ts_millis":"soon","state":"Paused","media_url":""}"#;
        assert!(matches!(
            decode_frame(wrong_type),
            Err(FeedError::Malformed(_))
        ));
    }
}
