#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use rhythm_engine::{EngineEvent, EventKind, Note, Pattern, RhythmEngine, RhythmEngineOptions};

/// Shared log of every event emitted by an engine.
pub type EventLog = Arc<Mutex<Vec<EngineEvent>>>;

pub fn record_all(engine: &mut RhythmEngine) -> EventLog {
    let log: EventLog = Arc::default();
    for kind in EventKind::ALL {
        let log = Arc::clone(&log);
        engine.add_event_listener(
            kind,
            Box::new(move |event| {
                log.lock().unwrap().push(event.clone());
                Ok(())
            }),
        );
    }
    log
}

pub fn kinds(log: &EventLog) -> Vec<EventKind> {
    log.lock().unwrap().iter().map(EngineEvent::kind).collect()
}

pub fn count(log: &EventLog, kind: EventKind) -> usize {
    log.lock()
        .unwrap()
        .iter()
        .filter(|e| e.kind() == kind)
        .count()
}

pub fn kick_pattern(times: &[f64]) -> Pattern {
    let notes = times.iter().map(|&t| Note::new(t, "kick")).collect();
    Pattern::new("kicks", times.last().copied().unwrap_or(0.0) + 1000.0, notes)
}

pub fn playing_engine(pattern: Pattern) -> RhythmEngine {
    let mut engine = RhythmEngine::new(RhythmEngineOptions::default()).unwrap();
    engine.load_pattern(pattern).unwrap();
    engine.start().unwrap();
    engine
}
