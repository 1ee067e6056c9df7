// Timing windows, accuracy classification, scoring, clear types

mod accuracy;
mod clear_type;
mod error;
mod game_stats;
mod hit_result;
mod score;
mod scoring_config;
mod timing;

pub use accuracy::Accuracy;
pub use clear_type::ClearType;
pub use error::ConfigError;
pub use game_stats::GameStats;
pub use hit_result::HitResult;
pub use score::ScoreAccumulator;
pub use scoring_config::{BasePoints, ComboMultiplier, ComboTier, ScoringConfig};
pub use timing::TimingWindows;
