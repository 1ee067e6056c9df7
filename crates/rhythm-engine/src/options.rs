use std::path::Path;

use anyhow::{Context, Result};
use rhythm_rule::ScoringConfig;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Engine construction options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RhythmEngineOptions {
    pub scoring_config: ScoringConfig,
    /// Milliseconds subtracted from every input and update timestamp
    pub latency_offset: f64,
    /// Sweep expired notes as misses during `update`
    pub auto_handle_misses: bool,
    /// Preview horizon for `upcoming_notes`, in ms. Not used for matching.
    pub look_ahead_time: f64,
}

impl Default for RhythmEngineOptions {
    fn default() -> Self {
        Self {
            scoring_config: ScoringConfig::default(),
            latency_offset: 0.0,
            auto_handle_misses: true,
            look_ahead_time: 2000.0,
        }
    }
}

impl RhythmEngineOptions {
    pub fn with_scoring_config(mut self, scoring_config: ScoringConfig) -> Self {
        self.scoring_config = scoring_config;
        self
    }

    pub fn with_latency_offset(mut self, latency_offset: f64) -> Self {
        self.latency_offset = latency_offset;
        self
    }

    pub fn with_auto_handle_misses(mut self, enabled: bool) -> Self {
        self.auto_handle_misses = enabled;
        self
    }

    pub fn with_look_ahead_time(mut self, look_ahead_time: f64) -> Self {
        self.look_ahead_time = look_ahead_time;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.scoring_config.validate()?;
        if !self.latency_offset.is_finite() {
            return Err(EngineError::InvalidOption {
                name: "latencyOffset",
                value: self.latency_offset,
            });
        }
        if !self.look_ahead_time.is_finite() || self.look_ahead_time < 0.0 {
            return Err(EngineError::InvalidOption {
                name: "lookAheadTime",
                value: self.look_ahead_time,
            });
        }
        Ok(())
    }

    /// Read options from a JSON file. Missing fields take their defaults.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading options {}", path.display()))?;
        let options: Self = serde_json::from_str(&data)
            .with_context(|| format!("parsing options {}", path.display()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
