use std::time::Instant;

use syncwatch_model::{AuthoritativeState, PlaybackState};

/// An authoritative state paired with the local time it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptStamp {
    pub state: AuthoritativeState,
    pub received_at: Instant,
}

impl ReceiptStamp {
    /// Stamps `state`, never moving backwards past `previous`.
    pub fn after(
        previous: Option<&ReceiptStamp>,
        state: AuthoritativeState,
        now: Instant,
    ) -> Self {
        let received_at = previous
            .map(|prev| prev.received_at.max(now))
            .unwrap_or(now);
        Self { state, received_at }
    }

    /// Where the controller's playhead should be at `now`.
    ///
    /// Playing states advance with local time since receipt; paused states
    /// stay put.
    pub fn expected_position_secs(&self, now: Instant) -> f64 {
        match self.state.playback {
            PlaybackState::Playing => {
                let elapsed = now.saturating_duration_since(self.received_at);
                self.state.position_secs() + elapsed.as_secs_f64()
            }
            PlaybackState::Paused => self.state.position_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn playing_state_extrapolates() {
        let now = Instant::now();
        let stamp = ReceiptStamp::after(
            None,
            AuthoritativeState::new(10_000, PlaybackState::Playing, "x.mp4"),
            now,
        );

        let expected =
            stamp.expected_position_secs(now + Duration::from_millis(2500));
        assert!((expected - 12.5).abs() < 1e-9);
    }

    #[test]
    fn paused_state_does_not_move() {
        let now = Instant::now();
        let stamp = ReceiptStamp::after(
            None,
            AuthoritativeState::new(4_000, PlaybackState::Paused, "x.mp4"),
            now,
        );

        assert_eq!(
            stamp.expected_position_secs(now + Duration::from_secs(30)),
            4.0
        );
    }

    #[test]
    fn stamps_are_monotonic() {
        let now = Instant::now();
        let first = ReceiptStamp::after(
            None,
            AuthoritativeState::new(0, PlaybackState::Paused, ""),
            now + Duration::from_secs(1),
        );
        let second = ReceiptStamp::after(
            Some(&first),
            AuthoritativeState::new(0, PlaybackState::Paused, ""),
            now,
        );

        assert_eq!(second.received_at, first.received_at);
    }
}
