use rhythm_model::PatternError;
use rhythm_rule::ConfigError;
use thiserror::Error;

use crate::state::GameState;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No pattern loaded")]
    NoPattern,

    #[error("Engine has been disposed")]
    Disposed,

    #[error("Cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: GameState,
    },

    #[error("Invalid scoring configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid option {name}: {value}")]
    InvalidOption { name: &'static str, value: f64 },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),
}
