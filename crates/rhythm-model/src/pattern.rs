use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::note::Note;

/// Time signature as numerator/denominator (e.g. 4/4, 7/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

/// Descriptive pattern metadata. Not used by judgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PatternMetadata {
    pub title: String,
    pub bpm: f64,
    pub time_signature: TimeSignature,
    pub difficulty: String,
}

impl Default for PatternMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            bpm: 120.0,
            time_signature: TimeSignature::default(),
            difficulty: String::new(),
        }
    }
}

/// A named region of the pattern timeline (intro, verse, fill, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    /// Start time in milliseconds (inclusive)
    pub start_time: f64,
    /// End time in milliseconds (exclusive)
    pub end_time: f64,
}

/// An immutable timeline of expected notes for one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    #[serde(default)]
    pub version: String,
    /// Total length in milliseconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub metadata: PatternMetadata,
    /// Notes sorted by time ascending (see [`Pattern::normalize`])
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Pattern {
    pub fn new(id: impl Into<String>, duration: f64, notes: Vec<Note>) -> Self {
        Self {
            id: id.into(),
            version: String::new(),
            duration,
            metadata: PatternMetadata::default(),
            notes,
            sections: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: PatternMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Decode a pattern from its JSON wire shape and normalize it.
    pub fn from_json_str(json: &str) -> Result<Self, PatternError> {
        let mut pattern: Pattern = serde_json::from_str(json)?;
        pattern.normalize()?;
        Ok(pattern)
    }

    /// Validate note times and sort notes by time.
    ///
    /// The sort is stable, so notes sharing a timestamp keep their authoring
    /// order. Returns `true` if the notes had to be reordered.
    pub fn normalize(&mut self) -> Result<bool, PatternError> {
        if !self.duration.is_finite() {
            return Err(PatternError::NonFiniteDuration);
        }
        if let Some(index) = self.notes.iter().position(|n| !n.time.is_finite()) {
            return Err(PatternError::NonFiniteTime { index });
        }
        if self.is_sorted_by_time() {
            return Ok(false);
        }
        log::warn!(
            "Pattern '{}': notes were not sorted by time, reordering {} notes",
            self.id,
            self.notes.len()
        );
        self.notes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(true)
    }

    pub fn is_sorted_by_time(&self) -> bool {
        self.notes.windows(2).all(|w| w[0].time <= w[1].time)
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Time of the last note, or `None` for an empty pattern.
    pub fn last_note_time(&self) -> Option<f64> {
        self.notes.last().map(|n| n.time)
    }

    /// The section containing `time`, if any.
    pub fn section_at(&self, time: f64) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| time >= s.start_time && time < s.end_time)
    }
}
