use std::path::Path;
use std::sync::mpsc;

use anyhow::{Context, Result, anyhow, bail};
use rhythm_engine::{
    EngineEvent, EventKind, FixedStepTicker, GameState, RhythmEngine, TickSource,
};
use rhythm_model::Pattern;
use rhythm_rule::{ClearType, GameStats, HitResult};
use serde::Serialize;

use crate::replay_data::{ReplayAction, ReplayData};

/// Result of replaying a recorded session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutcome {
    pub stats: GameStats,
    /// Every judgement in emission order
    pub results: Vec<HitResult>,
    pub final_state: GameState,
    /// Set when the pattern completed
    pub clear_type: Option<ClearType>,
}

impl ReplayOutcome {
    /// Whether the replay reproduced the stats stored in `replay`.
    pub fn matches_recording(&self, replay: &ReplayData) -> Option<bool> {
        replay.stats.as_ref().map(|s| *s == self.stats)
    }
}

/// Load and normalize a pattern JSON file.
pub fn read_pattern(path: &Path) -> Result<Pattern> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pattern: {}", path.display()))?;
    Pattern::from_json_str(&data)
        .with_context(|| format!("Failed to parse pattern: {}", path.display()))
}

/// Run `replay` against `pattern` on a fresh engine.
///
/// A recorded session repeats its actions in order with their recorded
/// times. An input log is started immediately and its inputs are delivered
/// in timestamp order, interleaved with fixed-step `update` ticks starting
/// at 0; an input at time `t` is delivered before the tick at `t`, and the
/// run ends at GAME_OVER or once the ticker passes every note deadline and
/// recorded input.
pub fn run_replay(pattern: Pattern, replay: &ReplayData) -> Result<ReplayOutcome> {
    let recorded = replay.is_recorded_session();
    if !recorded && (!replay.tick_ms.is_finite() || replay.tick_ms <= 0.0) {
        bail!("Invalid tick interval: {}ms", replay.tick_ms);
    }
    if !replay.pattern_id.is_empty() && replay.pattern_id != pattern.id {
        log::warn!(
            "Replay was recorded for pattern '{}', running against '{}'",
            replay.pattern_id,
            pattern.id
        );
    }

    let mut engine = RhythmEngine::new(replay.options.clone())?;
    let (tx, rx) = mpsc::channel::<HitResult>();
    for kind in [EventKind::Hit, EventKind::Miss] {
        let tx = tx.clone();
        engine.add_event_listener(
            kind,
            Box::new(move |event| match event {
                EngineEvent::Hit(result) | EngineEvent::Miss(result) => tx
                    .send(result.clone())
                    .map_err(|_| anyhow!("Replay result receiver dropped")),
                _ => Ok(()),
            }),
        );
    }
    drop(tx);

    if recorded {
        engine.load_pattern(pattern)?;
        repeat_actions(&mut engine, &replay.actions)?;
    } else {
        let end = tick_horizon(&pattern, replay);
        engine.load_pattern(pattern)?;
        engine.start()?;
        tick_inputs(&mut engine, replay, end);
    }

    let stats = engine.stats().clone();
    let final_state = engine.state();
    let clear_type = (final_state == GameState::GameOver).then(|| ClearType::from_stats(&stats));
    engine.dispose();

    Ok(ReplayOutcome {
        stats,
        results: rx.try_iter().collect(),
        final_state,
        clear_type,
    })
}

fn repeat_actions(engine: &mut RhythmEngine, actions: &[ReplayAction]) -> Result<()> {
    for action in actions {
        match action {
            ReplayAction::BeginCountdown => engine.begin_countdown()?,
            ReplayAction::Start => engine.start()?,
            ReplayAction::Pause => {
                engine.pause();
            }
            ReplayAction::Resume => {
                engine.resume();
            }
            ReplayAction::Stop => {
                engine.stop();
            }
            ReplayAction::Input { input } => {
                engine.process_input(input);
            }
            ReplayAction::Update { time } => engine.update(*time),
        }
    }
    log::debug!("Replay repeated {} actions", actions.len());
    Ok(())
}

fn tick_inputs(engine: &mut RhythmEngine, replay: &ReplayData, end: f64) {
    let inputs = replay.sorted_inputs();
    let mut pending = inputs.iter().peekable();
    let mut ticker = FixedStepTicker::new(0.0, replay.tick_ms, end);
    let mut ticks = 0u64;
    while let Some(tick) = ticker.next_tick() {
        while let Some(input) = pending.next_if(|i| i.timestamp <= tick) {
            engine.process_input(input);
        }
        engine.update(tick);
        ticks += 1;
        if engine.state() == GameState::GameOver {
            break;
        }
    }
    log::debug!(
        "Replay ran {} ticks, {} inputs undelivered",
        ticks,
        pending.count()
    );
}

/// Last tick time needed to resolve every note and deliver every input.
fn tick_horizon(pattern: &Pattern, replay: &ReplayData) -> f64 {
    let windows = &replay.options.scoring_config.windows;
    let last_deadline = pattern
        .last_note_time()
        .map_or(0.0, |t| windows.miss_deadline(t));
    let latency = replay.options.latency_offset.max(0.0);
    let last_input = replay.last_input_time().unwrap_or(0.0);
    pattern
        .duration
        .max(last_deadline + latency)
        .max(last_input)
        + replay.tick_ms
}
