use thiserror::Error;

/// Boxed transport error carried by the feed and command seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of the state feed. None of these are fatal: the supervisor
/// reconnects after its fixed delay.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to connect to state feed at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("state feed transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("malformed state feed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failures of an outbound controller command.
///
/// These are surfaced to the admin and never retried; local authoritative
/// state is not touched.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("controller rejected {command}: {status} {reason}")]
    Rejected {
        command: &'static str,
        status: u16,
        reason: String,
    },

    #[error("failed to send {command} to controller: {source}")]
    Transport {
        command: &'static str,
        #[source]
        source: BoxError,
    },
}

/// Failures bringing up the local media player.
///
/// Only raised during initialization, where they abort startup. Once running,
/// player commands are fire-and-forget.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("media surface unavailable: {0}")]
    Unavailable(String),
}
