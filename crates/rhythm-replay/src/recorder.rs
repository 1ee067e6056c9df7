//! Captures the driver calls of a live session for later replay.

use rhythm_engine::{EngineError, GameState, RhythmEngine, RhythmEngineOptions};
use rhythm_model::InputEvent;
use rhythm_rule::{GameStats, HitResult};

use crate::replay_data::{ReplayAction, ReplayData};

/// Forwards driver calls to the engine and records each one, accepted or
/// not, in call order.
pub struct ReplayRecorder {
    replay_data: ReplayData,
}

impl ReplayRecorder {
    pub fn new(pattern_id: impl Into<String>, options: RhythmEngineOptions) -> Self {
        Self {
            replay_data: ReplayData::new(pattern_id, options),
        }
    }

    /// Recorder for the pattern and options currently loaded in `engine`.
    ///
    /// When play is already under way the calls that reached the current
    /// state are recorded first.
    pub fn for_engine(engine: &RhythmEngine) -> Self {
        let pattern_id = engine
            .pattern()
            .map(|p| p.id.clone())
            .unwrap_or_default();
        let mut recorder = Self::new(pattern_id, engine.options().clone());
        let prelude: &[ReplayAction] = match engine.state() {
            GameState::Countdown => &[ReplayAction::BeginCountdown],
            GameState::Playing => &[ReplayAction::Start],
            GameState::Paused => &[ReplayAction::Start, ReplayAction::Pause],
            _ => &[],
        };
        recorder.replay_data.actions.extend_from_slice(prelude);
        recorder
    }

    /// Record a call the driver made on the engine directly.
    pub fn record(&mut self, action: ReplayAction) {
        self.replay_data.actions.push(action);
    }

    pub fn begin_countdown(&mut self, engine: &mut RhythmEngine) -> Result<(), EngineError> {
        self.record(ReplayAction::BeginCountdown);
        engine.begin_countdown()
    }

    /// Start play, keeping the options in effect now (a latency offset set
    /// by calibration included).
    pub fn start(&mut self, engine: &mut RhythmEngine) -> Result<(), EngineError> {
        self.replay_data.options = engine.options().clone();
        self.record(ReplayAction::Start);
        engine.start()
    }

    pub fn pause(&mut self, engine: &mut RhythmEngine) -> bool {
        self.record(ReplayAction::Pause);
        engine.pause()
    }

    pub fn resume(&mut self, engine: &mut RhythmEngine) -> bool {
        self.record(ReplayAction::Resume);
        engine.resume()
    }

    pub fn stop(&mut self, engine: &mut RhythmEngine) -> bool {
        self.record(ReplayAction::Stop);
        engine.stop()
    }

    pub fn process_input(
        &mut self,
        engine: &mut RhythmEngine,
        input: &InputEvent,
    ) -> Option<HitResult> {
        self.record(ReplayAction::Input {
            input: input.clone(),
        });
        engine.process_input(input)
    }

    pub fn update(&mut self, engine: &mut RhythmEngine, current_time: f64) {
        self.record(ReplayAction::Update { time: current_time });
        engine.update(current_time);
    }

    /// Store the final stats so a replay can be checked against them.
    pub fn set_stats(&mut self, stats: &GameStats) {
        self.replay_data.stats = Some(stats.clone());
    }

    pub fn action_count(&self) -> usize {
        self.replay_data.actions.len()
    }

    pub fn into_replay_data(self) -> ReplayData {
        self.replay_data
    }
}
