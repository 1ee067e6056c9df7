// Pattern data model: notes, metadata, input events

mod error;
mod input;
mod note;
mod pattern;

pub use error::PatternError;
pub use input::{InputEvent, InputValue};
pub use note::Note;
pub use pattern::{Pattern, PatternMetadata, Section, TimeSignature};
