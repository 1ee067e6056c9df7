use serde::{Deserialize, Serialize};

use crate::game_stats::GameStats;

/// Achievement for a completed playthrough, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ClearType {
    /// Nothing was judged (empty pattern)
    #[default]
    NoPlay,
    /// At least one miss
    Clear,
    /// No misses
    FullCombo,
    /// Every note PERFECT
    AllPerfect,
}

impl ClearType {
    pub fn from_stats(stats: &GameStats) -> Self {
        if stats.judged() == 0 {
            Self::NoPlay
        } else if stats.miss > 0 {
            Self::Clear
        } else if stats.perfect == stats.judged() {
            Self::AllPerfect
        } else {
            Self::FullCombo
        }
    }
}
