use thiserror::Error;

use crate::accuracy::Accuracy;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{grade:?} window must be a finite, non-negative number of ms (got {value})")]
    InvalidWindow { grade: Accuracy, value: f64 },

    #[error("{wider:?} window ({wider_ms} ms) is narrower than {narrower:?} window ({narrower_ms} ms)")]
    WindowsOutOfOrder {
        narrower: Accuracy,
        narrower_ms: f64,
        wider: Accuracy,
        wider_ms: f64,
    },

    #[error("Invalid multiplier: {0}")]
    InvalidMultiplier(String),
}
