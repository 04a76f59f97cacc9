use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of labels the classification head can produce, plus the
/// `Unknown` sentinel for any index outside `0..9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Disgusted,
    Happy,
    Normal,
    Relaxed,
    Sad,
    Scared,
    Surprised,
    Uncomfortable,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Emotion {
    /// Every real label, ordered by class index.
    pub const ALL: [Emotion; 9] = [
        Emotion::Angry,
        Emotion::Disgusted,
        Emotion::Happy,
        Emotion::Normal,
        Emotion::Relaxed,
        Emotion::Sad,
        Emotion::Scared,
        Emotion::Surprised,
        Emotion::Uncomfortable,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(Emotion::Unknown)
    }

    /// Class index of the label, `None` for `Unknown`.
    pub fn index(&self) -> Option<usize> {
        Self::ALL.iter().position(|e| e == self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgusted => "disgusted",
            Emotion::Happy => "happy",
            Emotion::Normal => "normal",
            Emotion::Relaxed => "relaxed",
            Emotion::Sad => "sad",
            Emotion::Scared => "scared",
            Emotion::Surprised => "surprised",
            Emotion::Uncomfortable => "uncomfortable",
            Emotion::Unknown => "Unknown",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Angry => "😡",
            Emotion::Disgusted => "🤢",
            Emotion::Happy => "😄",
            Emotion::Normal => "😐",
            Emotion::Relaxed => "😌",
            Emotion::Sad => "😢",
            Emotion::Scared => "😨",
            Emotion::Surprised => "😮",
            Emotion::Uncomfortable => "😖",
            Emotion::Unknown => "❓",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized emotion label: {0}")]
pub struct ParseEmotionError(pub String);

impl FromStr for Emotion {
    type Err = ParseEmotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Emotion::Unknown.as_str() {
            return Ok(Emotion::Unknown);
        }
        Self::ALL
            .iter()
            .find(|e| e.as_str() == s)
            .copied()
            .ok_or_else(|| ParseEmotionError(s.to_string()))
    }
}
