use rhythm_model::Note;

use crate::processed::ProcessedSet;

/// Indices of unprocessed notes whose hit window closed before `time`.
///
/// A note expires once `note.time + okay_window < time`. `notes` must be
/// sorted by time, so the scan stops at the first note still in reach.
pub fn expired_notes(
    notes: &[Note],
    processed: &ProcessedSet,
    time: f64,
    okay_window: f64,
) -> Vec<usize> {
    let start = processed.first_pending();
    notes
        .iter()
        .enumerate()
        .skip(start)
        .take_while(|(_, note)| note.time + okay_window < time)
        .filter(|&(index, _)| !processed.is_processed(index))
        .map(|(index, _)| index)
        .collect()
}
