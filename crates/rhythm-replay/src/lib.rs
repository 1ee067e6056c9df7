// Deterministic replay of recorded input against a pattern

mod recorder;
mod replay_data;
mod runner;

pub use recorder::ReplayRecorder;
pub use replay_data::{DEFAULT_TICK_MS, ReplayAction, ReplayData};
pub use runner::{ReplayOutcome, read_pattern, run_replay};
