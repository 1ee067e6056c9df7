use serde::{Deserialize, Serialize};

use crate::accuracy::Accuracy;
use crate::error::ConfigError;

/// Accuracy windows in milliseconds, applied to `|actual - expected|`.
///
/// Each tier is inclusive and the tiers must be non-decreasing:
/// `perfect <= great <= good <= okay`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct TimingWindows {
    pub perfect: f64,
    pub great: f64,
    pub good: f64,
    pub okay: f64,
}

impl Default for TimingWindows {
    fn default() -> Self {
        Self {
            perfect: 30.0,
            great: 60.0,
            good: 90.0,
            okay: 120.0,
        }
    }
}

impl TimingWindows {
    pub fn new(perfect: f64, great: f64, good: f64, okay: f64) -> Self {
        Self {
            perfect,
            great,
            good,
            okay,
        }
    }

    fn tiers(&self) -> [(Accuracy, f64); 4] {
        [
            (Accuracy::Perfect, self.perfect),
            (Accuracy::Great, self.great),
            (Accuracy::Good, self.good),
            (Accuracy::Okay, self.okay),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tiers = self.tiers();
        for (grade, value) in tiers {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWindow { grade, value });
            }
        }
        for pair in tiers.windows(2) {
            let (narrower, narrower_ms) = pair[0];
            let (wider, wider_ms) = pair[1];
            if wider_ms < narrower_ms {
                return Err(ConfigError::WindowsOutOfOrder {
                    narrower,
                    narrower_ms,
                    wider,
                    wider_ms,
                });
            }
        }
        Ok(())
    }

    /// Classify a signed offset (`actual - expected`, negative = early).
    ///
    /// The first tier whose window contains `|delta_ms|` wins; anything
    /// beyond the okay window is a miss.
    pub fn classify(&self, delta_ms: f64) -> Accuracy {
        let abs_delta = delta_ms.abs();
        self.tiers()
            .into_iter()
            .find(|&(_, window)| abs_delta <= window)
            .map_or(Accuracy::Miss, |(grade, _)| grade)
    }

    /// Whether `delta_ms` can still be judged as a hit.
    pub fn contains(&self, delta_ms: f64) -> bool {
        delta_ms.abs() <= self.okay
    }

    /// Latest time at which a note at `note_time` can still be hit.
    pub fn miss_deadline(&self, note_time: f64) -> f64 {
        note_time + self.okay
    }
}
