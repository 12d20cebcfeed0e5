//! The closed three-class sentiment label set.

use serde::{Deserialize, Serialize};

/// Sentiment label, in fixed class-index order.
///
/// The index mapping (0: positive, 1: negative, 2: neutral) is shared by
/// both classifiers and the ensemble combiner; no other label is ever
/// produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Number of sentiment classes.
    pub const COUNT: usize = 3;

    /// Map a class index to its label. Indexes outside `0..3` have none.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Positive),
            1 => Some(Self::Negative),
            2 => Some(Self::Neutral),
            _ => None,
        }
    }

    /// The class index of this label.
    pub fn index(self) -> usize {
        match self {
            Self::Positive => 0,
            Self::Negative => 1,
            Self::Neutral => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
