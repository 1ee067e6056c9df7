use rhythm_model::{InputEvent, Note};

use crate::processed::ProcessedSet;

/// Note chosen for an input, with its signed offset (`time - note.time`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub delta: f64,
}

/// Find the unprocessed note that `input` resolves at `time`.
///
/// Only notes within `okay_window` ms of `time` whose type or device code
/// matches the input are considered. The closest one wins; when several are
/// equally close the lowest index is chosen. `notes` must be sorted by time.
pub fn best_match(
    notes: &[Note],
    processed: &ProcessedSet,
    input: &InputEvent,
    time: f64,
    okay_window: f64,
) -> Option<Candidate> {
    if !time.is_finite() {
        return None;
    }
    let lo = notes.partition_point(|n| n.time < time - okay_window);
    let hi = notes.partition_point(|n| n.time <= time + okay_window);

    let mut best: Option<Candidate> = None;
    for (offset, note) in notes[lo..hi].iter().enumerate() {
        let index = lo + offset;
        if processed.is_processed(index) || !input.matches(note) {
            continue;
        }
        let delta = time - note.time;
        if delta.abs() > okay_window {
            continue;
        }
        // Strict comparison keeps the earliest index on ties.
        if best.is_none_or(|b| delta.abs() < b.delta.abs()) {
            best = Some(Candidate { index, delta });
        }
    }
    best
}
