use serde::{Deserialize, Serialize};

use crate::accuracy::Accuracy;

/// Cumulative statistics for one playthrough.
///
/// Mutated only through [`ScoreAccumulator`](crate::ScoreAccumulator);
/// consumers receive snapshots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub okay: u32,
    pub miss: u32,
    /// Hits before the note time
    pub early: u32,
    /// Hits after the note time
    pub late: u32,
    pub total_notes: usize,
    pub notes_hit: u32,
    /// Weighted accuracy over judged notes, 0-100
    pub accuracy: f64,
    /// Judged notes / total notes, 0-1
    pub progress: f64,
}

impl GameStats {
    pub fn new(total_notes: usize) -> Self {
        Self {
            total_notes,
            ..Default::default()
        }
    }

    pub fn count(&self, accuracy: Accuracy) -> u32 {
        match accuracy {
            Accuracy::Perfect => self.perfect,
            Accuracy::Great => self.great,
            Accuracy::Good => self.good,
            Accuracy::Okay => self.okay,
            Accuracy::Miss => self.miss,
        }
    }

    pub(crate) fn count_mut(&mut self, accuracy: Accuracy) -> &mut u32 {
        match accuracy {
            Accuracy::Perfect => &mut self.perfect,
            Accuracy::Great => &mut self.great,
            Accuracy::Good => &mut self.good,
            Accuracy::Okay => &mut self.okay,
            Accuracy::Miss => &mut self.miss,
        }
    }

    /// Notes finalized so far (hits + misses).
    pub fn judged(&self) -> u32 {
        self.notes_hit + self.miss
    }

    pub fn is_complete(&self) -> bool {
        self.total_notes > 0 && self.judged() as usize >= self.total_notes
    }

    pub(crate) fn recompute(&mut self) {
        let judged = self.judged();
        self.accuracy = if judged == 0 {
            0.0
        } else {
            let weighted: f64 = Accuracy::ALL
                .iter()
                .map(|&a| self.count(a) as f64 * a.weight())
                .sum();
            weighted / judged as f64 * 100.0
        };
        self.progress = if self.total_notes == 0 {
            0.0
        } else {
            judged as f64 / self.total_notes as f64
        };
    }
}
