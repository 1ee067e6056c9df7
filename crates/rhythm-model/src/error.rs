use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Failed to decode pattern: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Note {index} has a non-finite time")]
    NonFiniteTime { index: usize },

    #[error("Pattern duration is not finite")]
    NonFiniteDuration,
}
