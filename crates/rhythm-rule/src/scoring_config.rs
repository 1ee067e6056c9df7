use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::accuracy::Accuracy;
use crate::error::ConfigError;
use crate::timing::TimingWindows;

/// Base points per hit grade, before multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasePoints {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub okay: u32,
}

impl Default for BasePoints {
    fn default() -> Self {
        Self {
            perfect: 100,
            great: 75,
            good: 50,
            okay: 25,
        }
    }
}

impl BasePoints {
    /// Base points for a hit grade; `Miss` has no base points.
    pub fn for_accuracy(&self, accuracy: Accuracy) -> u32 {
        match accuracy {
            Accuracy::Perfect => self.perfect,
            Accuracy::Great => self.great,
            Accuracy::Good => self.good,
            Accuracy::Okay => self.okay,
            Accuracy::Miss => 0,
        }
    }
}

/// One step of a tiered combo multiplier: applies from `min_combo` upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboTier {
    pub min_combo: u32,
    pub multiplier: f64,
}

impl ComboTier {
    pub const fn new(min_combo: u32, multiplier: f64) -> Self {
        Self {
            min_combo,
            multiplier,
        }
    }
}

/// Combo-dependent score multiplier.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComboMultiplier {
    /// Always 1.0
    Flat,
    /// Highest tier whose `min_combo` is reached; 1.0 below the first tier.
    /// Tiers must be strictly ascending by `min_combo`.
    Tiered(Vec<ComboTier>),
    /// Programmatic multiplier (not serializable)
    #[serde(skip)]
    Custom(Arc<dyn Fn(u32) -> f64 + Send + Sync>),
}

impl fmt::Debug for ComboMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("Flat"),
            Self::Tiered(tiers) => f.debug_tuple("Tiered").field(tiers).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

const DEFAULT_COMBO_TIERS: [ComboTier; 5] = [
    ComboTier::new(0, 1.0),
    ComboTier::new(10, 1.5),
    ComboTier::new(25, 2.0),
    ComboTier::new(50, 2.5),
    ComboTier::new(100, 3.0),
];

impl Default for ComboMultiplier {
    fn default() -> Self {
        Self::Tiered(DEFAULT_COMBO_TIERS.to_vec())
    }
}

impl ComboMultiplier {
    pub fn custom(f: impl Fn(u32) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn multiplier(&self, combo: u32) -> f64 {
        match self {
            Self::Flat => 1.0,
            Self::Tiered(tiers) => tiers
                .iter()
                .take_while(|t| t.min_combo <= combo)
                .last()
                .map_or(1.0, |t| t.multiplier),
            Self::Custom(f) => f(combo),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let Self::Tiered(tiers) = self else {
            return Ok(());
        };
        if let Some(t) = tiers
            .iter()
            .find(|t| !t.multiplier.is_finite() || t.multiplier < 0.0)
        {
            return Err(ConfigError::InvalidMultiplier(format!(
                "combo tier at {} has multiplier {}",
                t.min_combo, t.multiplier
            )));
        }
        if tiers.windows(2).any(|w| w[0].min_combo >= w[1].min_combo) {
            return Err(ConfigError::InvalidMultiplier(
                "combo tiers must be strictly ascending by minCombo".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scoring rules: base points, accuracy windows and multipliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ScoringConfig {
    pub base_points: BasePoints,
    /// Points awarded for a miss
    pub miss_points: u32,
    pub windows: TimingWindows,
    pub combo_multiplier: ComboMultiplier,
    /// Fixed factor applied to every hit
    pub difficulty_multiplier: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_points: BasePoints::default(),
            miss_points: 0,
            windows: TimingWindows::default(),
            combo_multiplier: ComboMultiplier::default(),
            difficulty_multiplier: 1.0,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.windows.validate()?;
        self.combo_multiplier.validate()?;
        if !self.difficulty_multiplier.is_finite() || self.difficulty_multiplier < 0.0 {
            return Err(ConfigError::InvalidMultiplier(format!(
                "difficulty multiplier {}",
                self.difficulty_multiplier
            )));
        }
        Ok(())
    }

    /// Points for a judgement, given the combo *before* this judgement.
    ///
    /// `round(base * combo_multiplier(combo_before) * difficulty)` for hits,
    /// `miss_points` for a miss.
    pub fn points_for(&self, accuracy: Accuracy, combo_before: u32) -> u32 {
        if !accuracy.is_hit() {
            return self.miss_points;
        }
        let base = self.base_points.for_accuracy(accuracy) as f64;
        let combo = self.combo_multiplier.multiplier(combo_before);
        let points = (base * combo * self.difficulty_multiplier).round();
        // Custom multipliers may go negative; score never decreases
        points.max(0.0) as u32
    }
}
