use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::note::Note;

/// Matching key carried by an input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Device-native code, compared against `Note::midi_note`
    Code(u8),
    /// Instrument name, compared against `Note::note_type`
    Name(String),
    /// Any other payload; matched like an event without a value
    Other(Value),
}

impl<'de> Deserialize<'de> for InputValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<Value> for InputValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => Self::Name(name),
            Value::Number(n) => match device_code(&n) {
                Some(code) => Self::Code(code),
                None => Self::Other(Value::Number(n)),
            },
            other => Self::Other(other),
        }
    }
}

/// Numbers such as `36` or `36.0` round to a code; out of `0..=255` is none.
fn device_code(n: &Number) -> Option<u8> {
    if let Some(code) = n.as_u64() {
        return u8::try_from(code).ok();
    }
    let rounded = n.as_f64()?.round();
    (0.0..=255.0).contains(&rounded).then_some(rounded as u8)
}

/// A timestamped player input, translated from a raw device signal by an
/// external input source (MIDI decoder, keyboard mapper, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEvent {
    /// Source event type ("noteon", "keydown", or an instrument name)
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<InputValue>,
    /// Milliseconds, same clock domain as pattern note times
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Raw MIDI velocity or a normalized `0..1` level, as the source reports it
    pub velocity: Option<f64>,
    /// The raw device payload, kept opaque for consumers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_event: Option<serde_json::Value>,
}

impl InputEvent {
    pub fn new(kind: impl Into<String>, timestamp: f64) -> Self {
        Self {
            kind: kind.into(),
            value: None,
            timestamp,
            velocity: None,
            original_event: None,
        }
    }

    /// A MIDI note-on event for `code`.
    pub fn midi(code: u8, velocity: u8, timestamp: f64) -> Self {
        Self {
            kind: "noteon".to_string(),
            value: Some(InputValue::Code(code)),
            timestamp,
            velocity: Some(f64::from(velocity)),
            original_event: None,
        }
    }

    /// A keyboard-fallback event that already resolved to an instrument name.
    pub fn keyboard(note_type: impl Into<String>, timestamp: f64) -> Self {
        Self {
            kind: "keydown".to_string(),
            value: Some(InputValue::Name(note_type.into())),
            timestamp,
            velocity: None,
            original_event: None,
        }
    }

    pub fn with_value(mut self, value: InputValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Whether this input can resolve `note`.
    ///
    /// A device code only matches notes with the same `midi_note`; a name
    /// matches the note type. Without a value the event type itself is
    /// compared against the note type.
    pub fn matches(&self, note: &Note) -> bool {
        match &self.value {
            Some(InputValue::Code(code)) => note.midi_note == Some(*code),
            Some(InputValue::Name(name)) => note.note_type == *name,
            Some(InputValue::Other(_)) | None => note.note_type == self.kind,
        }
    }
}
