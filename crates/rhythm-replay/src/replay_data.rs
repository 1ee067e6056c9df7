use std::path::Path;

use anyhow::{Context, Result};
use rhythm_engine::RhythmEngineOptions;
use rhythm_model::InputEvent;
use rhythm_rule::GameStats;
use serde::{Deserialize, Serialize};

/// Default tick interval, roughly one 60 Hz frame.
pub const DEFAULT_TICK_MS: f64 = 16.0;

/// One driver call, with the time the caller passed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ReplayAction {
    BeginCountdown,
    Start,
    Pause,
    Resume,
    Stop,
    Input { input: InputEvent },
    Update { time: f64 },
}

/// A recorded playthrough and the options it ran with.
///
/// A recorded session carries `actions`, replayed call for call. A
/// hand-written input log carries only `inputs`, which are fed to a playing
/// engine between fixed `tick_ms` updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayData {
    /// Id of the pattern this replay was recorded against.
    #[serde(default)]
    pub pattern_id: String,
    /// Driver calls in the order they reached the engine.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ReplayAction>,
    /// Input events in delivery order, used when `actions` is empty.
    #[serde(default)]
    pub inputs: Vec<InputEvent>,
    /// Interval between `update` calls when replaying `inputs`.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: f64,
    #[serde(default)]
    pub options: RhythmEngineOptions,
    /// Final stats of the recorded run, if it finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<GameStats>,
}

fn default_tick_ms() -> f64 {
    DEFAULT_TICK_MS
}

impl Default for ReplayData {
    fn default() -> Self {
        Self {
            pattern_id: String::new(),
            actions: Vec::new(),
            inputs: Vec::new(),
            tick_ms: DEFAULT_TICK_MS,
            options: RhythmEngineOptions::default(),
            stats: None,
        }
    }
}

impl ReplayData {
    pub fn new(pattern_id: impl Into<String>, options: RhythmEngineOptions) -> Self {
        Self {
            pattern_id: pattern_id.into(),
            options,
            ..Default::default()
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay: {}", path.display()))?;
        let replay: ReplayData = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse replay: {}", path.display()))?;
        replay.options.validate()?;
        Ok(replay)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write replay: {}", path.display()))?;
        Ok(())
    }

    /// Inputs ordered by timestamp; equal timestamps keep recorded order.
    pub fn sorted_inputs(&self) -> Vec<InputEvent> {
        let mut inputs = self.inputs.clone();
        inputs.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        inputs
    }

    pub fn is_recorded_session(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn last_input_time(&self) -> Option<f64> {
        self.inputs
            .iter()
            .map(|i| i.timestamp)
            .filter(|t| t.is_finite())
            .reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_defaults() {
        let replay: ReplayData = serde_json::from_str(r#"{"patternId": "p1"}"#).unwrap();
        assert_eq!(replay.pattern_id, "p1");
        assert!(replay.inputs.is_empty());
        assert!(!replay.is_recorded_session());
        assert_eq!(replay.tick_ms, DEFAULT_TICK_MS);
        assert!(replay.options.auto_handle_misses);
        assert!(replay.stats.is_none());
    }

    #[test]
    fn parses_recorded_inputs() {
        let json = r#"{
            "patternId": "drums",
            "tickMs": 8,
            "inputs": [
                {"type": "noteon", "value": 36, "timestamp": 1002.5, "velocity": 90},
                {"type": "keydown", "value": "snare", "timestamp": 1500}
            ],
            "options": {"latencyOffset": 12}
        }"#;
        let replay: ReplayData = serde_json::from_str(json).unwrap();
        assert_eq!(replay.tick_ms, 8.0);
        assert_eq!(replay.inputs.len(), 2);
        assert_eq!(replay.inputs[0].velocity, Some(90.0));
        assert_eq!(replay.options.latency_offset, 12.0);
        assert_eq!(replay.last_input_time(), Some(1500.0));
    }

    #[test]
    fn parses_action_log() {
        let json = r#"{
            "patternId": "drums",
            "actions": [
                {"action": "start"},
                {"action": "input", "input": {"type": "kick", "timestamp": 990}},
                {"action": "update", "time": 1000},
                {"action": "pause"}
            ]
        }"#;
        let replay: ReplayData = serde_json::from_str(json).unwrap();
        assert!(replay.is_recorded_session());
        assert_eq!(replay.actions[0], ReplayAction::Start);
        assert_eq!(
            replay.actions[1],
            ReplayAction::Input {
                input: InputEvent::new("kick", 990.0)
            }
        );
        assert_eq!(replay.actions[2], ReplayAction::Update { time: 1000.0 });
        assert_eq!(replay.actions[3], ReplayAction::Pause);
    }

    #[test]
    fn sorted_inputs_is_stable() {
        let replay = ReplayData {
            inputs: vec![
                InputEvent::new("snare", 200.0),
                InputEvent::new("kick", 100.0),
                InputEvent::new("hihat", 100.0),
            ],
            ..Default::default()
        };
        let kinds: Vec<String> = replay.sorted_inputs().into_iter().map(|i| i.kind).collect();
        assert_eq!(kinds, ["kick", "hihat", "snare"]);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.json");
        let mut replay = ReplayData::new("p", RhythmEngineOptions::default());
        replay.inputs.push(InputEvent::keyboard("kick", 1000.0));
        replay.write(&path).unwrap();

        let loaded = ReplayData::read(&path).unwrap();
        assert_eq!(loaded.pattern_id, "p");
        assert_eq!(loaded.inputs, replay.inputs);
    }

    #[test]
    fn read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReplayData::read(&dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read replay"));
    }
}
