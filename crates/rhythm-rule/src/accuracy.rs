use serde::{Deserialize, Serialize};

/// Accuracy grade of a judged note.
///
/// Ordered from most to least favorable, so `Perfect < Miss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Accuracy {
    Perfect,
    Great,
    Good,
    Okay,
    Miss,
}

impl Accuracy {
    /// All grades, most favorable first.
    pub const ALL: [Accuracy; 5] = [
        Accuracy::Perfect,
        Accuracy::Great,
        Accuracy::Good,
        Accuracy::Okay,
        Accuracy::Miss,
    ];

    /// Returns true for every grade except `Miss`.
    pub fn is_hit(self) -> bool {
        !matches!(self, Self::Miss)
    }

    /// Weight of this grade in the accuracy percentage.
    pub fn weight(self) -> f64 {
        match self {
            Self::Perfect => 1.0,
            Self::Great => 0.9,
            Self::Good => 0.7,
            Self::Okay => 0.5,
            Self::Miss => 0.0,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}
