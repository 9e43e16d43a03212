use std::fmt::{self, Display};

/// Errors produced by model parsers and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Seek input was neither `<seconds>` nor `<minutes>:<seconds>`.
    InvalidSeekInput(String),
    /// Seek input parsed, but to zero; zero is treated as "no input".
    ZeroSeek,
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidSeekInput(raw) => {
                write!(f, "invalid seek input: {raw:?}")
            }
            ModelError::ZeroSeek => write!(f, "seek input resolved to zero"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
