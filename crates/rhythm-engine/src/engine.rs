use std::fmt;
use std::sync::Arc;

use rhythm_model::{InputEvent, Note, Pattern};
use rhythm_rule::{Accuracy, ClearType, GameStats, HitResult, ScoreAccumulator};

use crate::calibration::Calibrator;
use crate::error::EngineError;
use crate::event::{EngineEvent, EventBus, EventKind, Listener, ListenerId};
use crate::matcher;
use crate::miss_scanner;
use crate::options::RhythmEngineOptions;
use crate::processed::ProcessedSet;
use crate::scheduler::SchedulerHandle;
use crate::state::{GameState, Transition};

/// Hit detection and scoring for one loaded pattern.
///
/// Every operation runs to completion synchronously and all times are
/// supplied by the caller. Input and tick callers on different threads must
/// share the engine behind a single lock (e.g. `Mutex<RhythmEngine>`).
pub struct RhythmEngine {
    options: RhythmEngineOptions,
    pattern: Option<Arc<Pattern>>,
    processed: ProcessedSet,
    score: ScoreAccumulator,
    state: GameState,
    bus: EventBus,
    /// Last accepted `update` time, before latency adjustment
    last_update: Option<f64>,
    scheduler: Option<Box<dyn SchedulerHandle>>,
    calibrator: Option<Calibrator>,
}

impl fmt::Debug for RhythmEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RhythmEngine")
            .field("state", &self.state)
            .field("pattern", &self.pattern.as_ref().map(|p| p.id.as_str()))
            .field("processed", &self.processed.count())
            .field("stats", self.score.stats())
            .field("bus", &self.bus)
            .field("scheduler", &self.scheduler.is_some())
            .finish_non_exhaustive()
    }
}

impl RhythmEngine {
    pub fn new(options: RhythmEngineOptions) -> Result<Self, EngineError> {
        options.validate()?;
        Ok(Self {
            options,
            pattern: None,
            processed: ProcessedSet::default(),
            score: ScoreAccumulator::default(),
            state: GameState::Idle,
            bus: EventBus::new(),
            last_update: None,
            scheduler: None,
            calibrator: None,
        })
    }

    pub fn add_event_listener(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        self.bus.add_listener(kind, listener)
    }

    pub fn remove_event_listener(&mut self, kind: EventKind, id: ListenerId) -> bool {
        self.bus.remove_listener(kind, id)
    }

    /// Attach the driver's scheduler so `stop()` can halt it.
    pub fn attach_scheduler(&mut self, handle: impl SchedulerHandle + 'static) {
        self.scheduler = Some(Box::new(handle));
    }

    pub fn detach_scheduler(&mut self) -> Option<Box<dyn SchedulerHandle>> {
        self.scheduler.take()
    }

    /// Replace the pattern and reset all play state to IDLE.
    pub fn load_pattern(&mut self, mut pattern: Pattern) -> Result<(), EngineError> {
        self.ensure_live()?;
        if let Err(e) = pattern.normalize() {
            self.emit_error(format!("Failed to load pattern '{}': {}", pattern.id, e));
            return Err(e.into());
        }
        self.install(Arc::new(pattern));
        Ok(())
    }

    /// Restart the current pattern from scratch.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.ensure_live()?;
        let pattern = self.pattern.clone().ok_or(EngineError::NoPattern)?;
        self.install(pattern);
        Ok(())
    }

    fn install(&mut self, pattern: Arc<Pattern>) {
        log::info!(
            "Loaded pattern '{}' ({} notes, {}ms)",
            pattern.id,
            pattern.note_count(),
            pattern.duration
        );
        self.processed.reset(pattern.note_count());
        self.score.reset(pattern.note_count());
        self.last_update = None;
        self.calibrator = None;
        self.pattern = Some(Arc::clone(&pattern));

        self.bus.emit(&EngineEvent::PatternLoaded(pattern));
        self.transition(Transition::Reset);
        self.emit_stats();
    }

    /// IDLE -> COUNTDOWN.
    pub fn begin_countdown(&mut self) -> Result<(), EngineError> {
        self.ensure_live()?;
        if self.pattern.is_none() {
            return Err(EngineError::NoPattern);
        }
        self.transition(Transition::BeginCountdown);
        Ok(())
    }

    /// IDLE or COUNTDOWN -> PLAYING. From any other state this is a no-op.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.ensure_live()?;
        let Some(pattern) = self.pattern.clone() else {
            self.emit_error("Cannot start: no pattern loaded".to_string());
            return Err(EngineError::NoPattern);
        };
        if self.transition(Transition::Start) {
            log::info!("Started pattern '{}'", pattern.id);
            self.bus.emit(&EngineEvent::PatternStarted(pattern));
        }
        Ok(())
    }

    pub fn pause(&mut self) -> bool {
        self.transition(Transition::Pause)
    }

    pub fn resume(&mut self) -> bool {
        self.transition(Transition::Resume)
    }

    /// Like `pause`, and also halts the attached scheduler.
    pub fn stop(&mut self) -> bool {
        if !self.transition(Transition::Stop) {
            return false;
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.halt();
        }
        true
    }

    /// IDLE -> CALIBRATING. Inputs are then recorded against a metronome
    /// starting at `first_beat` and ticking every `interval` ms.
    pub fn begin_calibration(&mut self, first_beat: f64, interval: f64) -> Result<(), EngineError> {
        self.ensure_live()?;
        if self.state.next(Transition::BeginCalibration).is_none() {
            return Err(EngineError::InvalidState {
                operation: "begin calibration",
                state: self.state,
            });
        }
        self.calibrator = Some(Calibrator::new(first_beat, interval)?);
        self.transition(Transition::BeginCalibration);
        Ok(())
    }

    /// Adopt the mean recorded offset as the latency offset and return to
    /// IDLE. Returns `None` (offset unchanged) if nothing was recorded.
    pub fn finish_calibration(&mut self) -> Option<f64> {
        if self.state != GameState::Calibrating {
            return None;
        }
        let mean = self.calibrator.take().and_then(|c| {
            log::debug!("Calibration finished with {} samples", c.sample_count());
            c.mean_offset()
        });
        if let Some(offset) = mean {
            log::info!("Latency offset calibrated to {:.1}ms", offset);
            self.options.latency_offset = offset;
        }
        self.transition(Transition::EndCalibration);
        mean
    }

    pub fn cancel_calibration(&mut self) {
        if self.state == GameState::Calibrating {
            self.calibrator = None;
            self.transition(Transition::EndCalibration);
        }
    }

    /// Judge one input against the pattern.
    ///
    /// Returns `None` when the input is dropped (not PLAYING) or matches no
    /// unprocessed note within the okay window.
    pub fn process_input(&mut self, input: &InputEvent) -> Option<HitResult> {
        if self.bus.is_disposed() {
            return None;
        }
        match self.state {
            GameState::Playing => {}
            GameState::Calibrating => {
                if let Some(calibrator) = self.calibrator.as_mut() {
                    calibrator.record(input.timestamp);
                }
                return None;
            }
            state => {
                log::debug!("Input '{}' dropped while {:?}", input.kind, state);
                return None;
            }
        }
        let pattern = self.pattern.clone()?;
        let time = input.timestamp - self.options.latency_offset;
        let windows = &self.options.scoring_config.windows;
        let candidate =
            matcher::best_match(&pattern.notes, &self.processed, input, time, windows.okay)?;
        let accuracy = windows.classify(candidate.delta);

        let result = self.finalize(&pattern, candidate.index, accuracy, candidate.delta, time);
        self.check_completion(None);
        result
    }

    /// Advance to `current_time`: sweep expired notes as misses (when
    /// enabled) and detect completion.
    ///
    /// A time at or before the last accepted update is ignored.
    pub fn update(&mut self, current_time: f64) {
        if self.bus.is_disposed() || !self.state.is_playing() || !current_time.is_finite() {
            return;
        }
        let Some(pattern) = self.pattern.clone() else {
            return;
        };
        if self.last_update.is_some_and(|last| current_time <= last) {
            return;
        }
        self.last_update = Some(current_time);

        let time = current_time - self.options.latency_offset;
        if self.options.auto_handle_misses {
            let okay = self.options.scoring_config.windows.okay;
            for index in miss_scanner::expired_notes(&pattern.notes, &self.processed, time, okay) {
                let delta = time - pattern.notes[index].time;
                self.finalize(&pattern, index, Accuracy::Miss, delta, time);
            }
        }
        self.check_completion(Some(time));
    }

    /// Mark, score and announce one judgement. Never judges a note twice.
    fn finalize(
        &mut self,
        pattern: &Pattern,
        index: usize,
        accuracy: Accuracy,
        time_delta: f64,
        timestamp: f64,
    ) -> Option<HitResult> {
        if !self.processed.mark(index) {
            return None;
        }
        let points = self
            .score
            .apply(&self.options.scoring_config, accuracy, time_delta);
        let result = HitResult {
            hit: accuracy.is_hit(),
            accuracy,
            time_delta,
            points,
            note_index: index,
            note: pattern.notes[index].clone(),
            timestamp,
        };
        log::debug!(
            "Note {} ({}) {:?} delta={:.1}ms points={} combo={}",
            index,
            result.note.note_type,
            accuracy,
            time_delta,
            points,
            self.score.stats().combo
        );

        self.emit_stats();
        let event = if result.hit {
            EngineEvent::Hit(result.clone())
        } else {
            EngineEvent::Miss(result.clone())
        };
        self.bus.emit(&event);
        Some(result)
    }

    /// Zero-note patterns complete only once an update reaches the
    /// pattern duration.
    fn check_completion(&mut self, time: Option<f64>) {
        if !self.state.is_playing() {
            return;
        }
        let Some(pattern) = self.pattern.clone() else {
            return;
        };
        let complete = if pattern.is_empty() {
            time.is_some_and(|t| t >= pattern.duration)
        } else {
            self.processed.is_complete()
        };
        if !complete || !self.transition(Transition::Complete) {
            return;
        }

        let stats = self.score.stats().clone();
        let clear_type = ClearType::from_stats(&stats);
        log::info!(
            "Completed pattern '{}': score={} max_combo={} accuracy={:.2}% {:?}",
            pattern.id,
            stats.score,
            stats.max_combo,
            stats.accuracy,
            clear_type
        );
        self.bus.emit(&EngineEvent::PatternCompleted {
            pattern,
            stats,
            clear_type,
        });
    }

    /// Apply `transition` if valid from the current state. Returns whether
    /// it was valid; GAME_STATE_CHANGED fires only when the state changes.
    fn transition(&mut self, transition: Transition) -> bool {
        if self.bus.is_disposed() {
            return false;
        }
        let Some(next) = self.state.next(transition) else {
            log::debug!("Ignoring {:?} while {:?}", transition, self.state);
            return false;
        };
        if next != self.state {
            log::debug!("State {:?} -> {:?}", self.state, next);
            self.state = next;
            self.bus.emit(&EngineEvent::GameStateChanged(next));
        }
        true
    }

    fn ensure_live(&self) -> Result<(), EngineError> {
        if self.bus.is_disposed() {
            return Err(EngineError::Disposed);
        }
        Ok(())
    }

    fn emit_stats(&mut self) {
        let stats = self.score.stats().clone();
        self.bus.emit(&EngineEvent::StatsUpdated(stats));
    }

    fn emit_error(&mut self, message: String) {
        log::warn!("{}", message);
        self.bus.emit(&EngineEvent::Error { message });
    }

    /// Clear all listeners and halt the scheduler. No event fires afterwards,
    /// inputs and updates are ignored and the state is frozen.
    pub fn dispose(&mut self) {
        if self.bus.is_disposed() {
            return;
        }
        self.bus.dispose();
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.halt();
        }
        self.calibrator = None;
        log::debug!("Engine disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.bus.is_disposed()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn stats(&self) -> &GameStats {
        self.score.stats()
    }

    pub fn pattern(&self) -> Option<&Arc<Pattern>> {
        self.pattern.as_ref()
    }

    pub fn options(&self) -> &RhythmEngineOptions {
        &self.options
    }

    pub fn latency_offset(&self) -> f64 {
        self.options.latency_offset
    }

    pub fn is_processed(&self, index: usize) -> bool {
        self.processed.is_processed(index)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.count()
    }

    /// Unprocessed notes between the okay window behind `current_time` and
    /// the look-ahead horizon in front of it.
    pub fn upcoming_notes(&self, current_time: f64) -> impl Iterator<Item = (usize, &Note)> + '_ {
        let time = current_time - self.options.latency_offset;
        let behind = time - self.options.scoring_config.windows.okay;
        let ahead = time + self.options.look_ahead_time;
        let notes: &[Note] = match &self.pattern {
            Some(pattern) => &pattern.notes,
            None => &[],
        };
        let lo = notes.partition_point(|n| n.time < behind);
        let hi = notes.partition_point(|n| n.time <= ahead).max(lo);
        notes[lo..hi]
            .iter()
            .enumerate()
            .map(move |(offset, note)| (lo + offset, note))
            .filter(move |&(index, _)| !self.processed.is_processed(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(notes: Vec<Note>) -> RhythmEngine {
        let mut engine = RhythmEngine::new(RhythmEngineOptions::default()).unwrap();
        engine
            .load_pattern(Pattern::new("test", 5000.0, notes))
            .unwrap();
        engine
    }

    fn assert_send<T: Send>() {}

    #[test]
    fn engine_is_send() {
        assert_send::<RhythmEngine>();
    }

    #[test]
    fn new_rejects_invalid_options() {
        let options = RhythmEngineOptions::default().with_look_ahead_time(f64::NAN);
        assert!(RhythmEngine::new(options).is_err());
    }

    #[test]
    fn load_resets_to_idle() {
        let mut engine = engine_with(vec![Note::new(1000.0, "kick")]);
        engine.start().unwrap();
        engine.process_input(&InputEvent::new("kick", 1000.0));
        assert_eq!(engine.state(), GameState::GameOver);

        engine
            .load_pattern(Pattern::new("next", 1000.0, vec![Note::new(500.0, "kick")]))
            .unwrap();
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.processed_count(), 0);
        assert_eq!(engine.stats(), &GameStats::new(1));
    }

    #[test]
    fn unsorted_pattern_is_normalized() {
        let engine = engine_with(vec![Note::new(2000.0, "snare"), Note::new(1000.0, "kick")]);
        let pattern = engine.pattern().unwrap();
        assert_eq!(pattern.notes[0].note_type, "kick");
    }

    #[test]
    fn non_finite_note_time_fails_load() {
        let mut engine = RhythmEngine::new(RhythmEngineOptions::default()).unwrap();
        let err = engine
            .load_pattern(Pattern::new("bad", 1000.0, vec![Note::new(f64::NAN, "kick")]))
            .unwrap_err();
        assert!(matches!(err, EngineError::Pattern(_)));
        assert!(engine.pattern().is_none());
    }

    #[test]
    fn start_without_pattern() {
        let mut engine = RhythmEngine::new(RhythmEngineOptions::default()).unwrap();
        assert!(matches!(engine.start(), Err(EngineError::NoPattern)));
        assert_eq!(engine.state(), GameState::Idle);
        assert!(matches!(
            engine.begin_countdown(),
            Err(EngineError::NoPattern)
        ));
        assert!(matches!(engine.reset(), Err(EngineError::NoPattern)));
    }

    #[test]
    fn input_dropped_unless_playing() {
        let mut engine = engine_with(vec![Note::new(1000.0, "kick")]);
        assert!(engine.process_input(&InputEvent::new("kick", 1000.0)).is_none());
        engine.begin_countdown().unwrap();
        assert!(engine.process_input(&InputEvent::new("kick", 1000.0)).is_none());
        engine.start().unwrap();
        engine.pause();
        assert!(engine.process_input(&InputEvent::new("kick", 1000.0)).is_none());
        assert_eq!(engine.processed_count(), 0);
        engine.resume();
        assert!(engine.process_input(&InputEvent::new("kick", 1000.0)).is_some());
    }

    #[test]
    fn latency_offset_is_subtracted() {
        let mut engine = RhythmEngine::new(RhythmEngineOptions::default().with_latency_offset(40.0))
            .unwrap();
        engine
            .load_pattern(Pattern::new("lat", 2000.0, vec![Note::new(1000.0, "kick")]))
            .unwrap();
        engine.start().unwrap();
        let result = engine.process_input(&InputEvent::new("kick", 1040.0)).unwrap();
        assert_eq!(result.time_delta, 0.0);
        assert_eq!(result.accuracy, Accuracy::Perfect);
        assert_eq!(result.timestamp, 1000.0);
    }

    #[test]
    fn update_time_must_advance() {
        let mut engine = engine_with(vec![Note::new(1000.0, "kick"), Note::new(3000.0, "kick")]);
        engine.start().unwrap();
        engine.update(1200.0);
        assert_eq!(engine.stats().miss, 1);
        engine.update(1200.0);
        engine.update(900.0);
        assert_eq!(engine.processed_count(), 1);
    }

    #[test]
    fn auto_miss_can_be_disabled() {
        let mut engine = RhythmEngine::new(
            RhythmEngineOptions::default().with_auto_handle_misses(false),
        )
        .unwrap();
        engine
            .load_pattern(Pattern::new("manual", 2000.0, vec![Note::new(1000.0, "kick")]))
            .unwrap();
        engine.start().unwrap();
        engine.update(4000.0);
        assert_eq!(engine.processed_count(), 0);
        assert_eq!(engine.state(), GameState::Playing);
    }

    #[test]
    fn upcoming_notes_window() {
        let mut engine = engine_with(vec![
            Note::new(500.0, "kick"),
            Note::new(1000.0, "kick"),
            Note::new(2500.0, "kick"),
            Note::new(4000.0, "kick"),
        ]);
        let upcoming: Vec<usize> = engine.upcoming_notes(600.0).map(|(i, _)| i).collect();
        assert_eq!(upcoming, [0, 1, 2]);

        engine.start().unwrap();
        engine.process_input(&InputEvent::new("kick", 1000.0));
        let upcoming: Vec<usize> = engine.upcoming_notes(600.0).map(|(i, _)| i).collect();
        assert_eq!(upcoming, [0, 2]);
    }

    #[test]
    fn reset_restarts_same_pattern() {
        let mut engine = engine_with(vec![Note::new(1000.0, "kick"), Note::new(2000.0, "kick")]);
        engine.start().unwrap();
        engine.process_input(&InputEvent::new("kick", 1000.0));
        engine.reset().unwrap();
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.processed_count(), 0);
        assert_eq!(engine.stats().score, 0);
        assert_eq!(engine.pattern().unwrap().id, "test");
    }

    #[test]
    fn lifecycle_is_frozen_after_dispose() {
        let mut engine = engine_with(vec![Note::new(1000.0, "kick")]);
        engine.dispose();
        assert!(matches!(engine.start(), Err(EngineError::Disposed)));
        assert!(matches!(engine.begin_countdown(), Err(EngineError::Disposed)));
        assert!(matches!(
            engine.begin_calibration(0.0, 500.0),
            Err(EngineError::Disposed)
        ));
        assert!(matches!(engine.reset(), Err(EngineError::Disposed)));
        assert!(matches!(
            engine.load_pattern(Pattern::new("next", 500.0, Vec::new())),
            Err(EngineError::Disposed)
        ));
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.pattern().unwrap().id, "test");
    }

    #[test]
    fn calibration_sets_latency() {
        let mut engine = engine_with(vec![Note::new(1000.0, "kick")]);
        engine.begin_calibration(0.0, 500.0).unwrap();
        assert_eq!(engine.state(), GameState::Calibrating);
        for ts in [520.0, 1010.0, 1530.0] {
            assert!(engine.process_input(&InputEvent::new("kick", ts)).is_none());
        }
        assert!(matches!(engine.start(), Ok(())));
        assert_eq!(engine.state(), GameState::Calibrating);

        let offset = engine.finish_calibration().unwrap();
        assert!((offset - 20.0).abs() < 1e-9);
        assert_eq!(engine.latency_offset(), offset);
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.processed_count(), 0);
    }

    #[test]
    fn calibration_requires_idle() {
        let mut engine = engine_with(vec![Note::new(1000.0, "kick")]);
        engine.start().unwrap();
        assert!(matches!(
            engine.begin_calibration(0.0, 500.0),
            Err(EngineError::InvalidState {
                state: GameState::Playing,
                ..
            })
        ));
        assert_eq!(engine.finish_calibration(), None);
    }

    #[test]
    fn cancel_calibration_keeps_offset() {
        let mut engine = engine_with(vec![Note::new(1000.0, "kick")]);
        engine.begin_calibration(0.0, 500.0).unwrap();
        engine.process_input(&InputEvent::new("kick", 530.0));
        engine.cancel_calibration();
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.latency_offset(), 0.0);
    }

    #[test]
    fn empty_calibration_keeps_offset() {
        let mut engine = engine_with(vec![Note::new(1000.0, "kick")]);
        engine.begin_calibration(0.0, 500.0).unwrap();
        assert_eq!(engine.finish_calibration(), None);
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.latency_offset(), 0.0);
    }
}
