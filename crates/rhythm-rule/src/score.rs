use crate::accuracy::Accuracy;
use crate::game_stats::GameStats;
use crate::scoring_config::ScoringConfig;

/// Converts judgements into points and keeps [`GameStats`] consistent.
#[derive(Debug, Clone, Default)]
pub struct ScoreAccumulator {
    stats: GameStats,
}

impl ScoreAccumulator {
    pub fn new(total_notes: usize) -> Self {
        let mut stats = GameStats::new(total_notes);
        stats.recompute();
        Self { stats }
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn reset(&mut self, total_notes: usize) {
        *self = Self::new(total_notes);
    }

    /// Apply one judgement and return the points it awarded.
    ///
    /// Points are computed from the combo *before* this judgement, then the
    /// combo is incremented (hit) or reset (miss).
    pub fn apply(&mut self, config: &ScoringConfig, accuracy: Accuracy, time_delta: f64) -> u32 {
        let points = config.points_for(accuracy, self.stats.combo);

        let stats = &mut self.stats;
        *stats.count_mut(accuracy) += 1;
        if accuracy.is_hit() {
            stats.combo += 1;
            stats.max_combo = stats.max_combo.max(stats.combo);
            stats.notes_hit += 1;
            if time_delta < 0.0 {
                stats.early += 1;
            } else if time_delta > 0.0 {
                stats.late += 1;
            }
        } else {
            stats.combo = 0;
        }
        stats.score += points as u64;
        stats.recompute();

        points
    }
}
