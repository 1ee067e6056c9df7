// Hit detection engine: matching, miss scanning, lifecycle, events

mod calibration;
mod engine;
mod error;
mod event;
pub mod matcher;
pub mod miss_scanner;
mod options;
mod processed;
mod scheduler;
mod state;

pub use calibration::Calibrator;
pub use engine::RhythmEngine;
pub use error::EngineError;
pub use event::{EngineEvent, EventBus, EventKind, Listener, ListenerId};
pub use options::RhythmEngineOptions;
pub use processed::ProcessedSet;
pub use scheduler::{FixedStepTicker, SchedulerHandle, TickSource};
pub use state::{GameState, Transition};

pub use rhythm_model::{InputEvent, InputValue, Note, Pattern, PatternMetadata};
pub use rhythm_rule::{Accuracy, ClearType, GameStats, HitResult, ScoringConfig, TimingWindows};
