use rhythm_model::Note;
use serde::{Deserialize, Serialize};

use crate::accuracy::Accuracy;

/// Outcome of judging one note, either from an input or a synthesized miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitResult {
    pub hit: bool,
    pub accuracy: Accuracy,
    /// `actual - expected` in ms; negative = early
    pub time_delta: f64,
    pub points: u32,
    /// Index of the judged note in the pattern
    pub note_index: usize,
    pub note: Note,
    /// Latency-adjusted time of the judgement
    pub timestamp: f64,
}

impl HitResult {
    pub fn is_early(&self) -> bool {
        self.hit && self.time_delta < 0.0
    }

    pub fn is_late(&self) -> bool {
        self.hit && self.time_delta > 0.0
    }
}
