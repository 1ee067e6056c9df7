use serde::{Deserialize, Serialize};

/// A single expected event in a pattern.
///
/// Notes carry no identity of their own: they are identified by their index
/// in the owning pattern's note sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Expected hit time in milliseconds
    pub time: f64,
    /// Sustain length in milliseconds (0 for one-shot hits)
    #[serde(default)]
    pub duration: f64,
    /// Instrument tag, e.g. "kick" or "snare"
    #[serde(rename = "type")]
    pub note_type: String,
    /// Device-native code (MIDI note number)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midi_note: Option<u8>,
}

impl Note {
    pub fn new(time: f64, note_type: impl Into<String>) -> Self {
        Self {
            time,
            duration: 0.0,
            note_type: note_type.into(),
            midi_note: None,
        }
    }

    pub fn with_midi_note(mut self, midi_note: u8) -> Self {
        self.midi_note = Some(midi_note);
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }
}
