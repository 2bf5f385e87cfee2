use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed emotion taxonomy. Every cataloged song carries exactly one of
/// these labels; `Ambiguous` is the catch-all for songs whose mood scores are
/// too weak to classify.
///
/// Declaration order matters: the semantic detector breaks score ties in favor
/// of the earlier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Sad,
    Melancholic,
    Nostalgic,
    Lonely,
    Relaxed,
    Focused,
    Hopeful,
    RomanticPassionate,
    RomanticTender,
    Party,
    Triumphant,
    Anxious,
    Angry,
    Ambiguous,
}

impl Emotion {
    /// Every label in the taxonomy, in declaration order.
    pub const ALL: [Emotion; 14] = [
        Emotion::Sad,
        Emotion::Melancholic,
        Emotion::Nostalgic,
        Emotion::Lonely,
        Emotion::Relaxed,
        Emotion::Focused,
        Emotion::Hopeful,
        Emotion::RomanticPassionate,
        Emotion::RomanticTender,
        Emotion::Party,
        Emotion::Triumphant,
        Emotion::Anxious,
        Emotion::Angry,
        Emotion::Ambiguous,
    ];

    /// Labels the semantic detector can match against. `Nostalgic` and
    /// `Ambiguous` have no semantic description — they only ever come out of
    /// the classifier.
    pub const DETECTABLE: [Emotion; 12] = [
        Emotion::Sad,
        Emotion::Melancholic,
        Emotion::Lonely,
        Emotion::Relaxed,
        Emotion::Focused,
        Emotion::Hopeful,
        Emotion::RomanticPassionate,
        Emotion::RomanticTender,
        Emotion::Party,
        Emotion::Triumphant,
        Emotion::Anxious,
        Emotion::Angry,
    ];

    /// Default label for songs that have no feature row.
    pub const DEFAULT: Emotion = Emotion::Focused;

    /// Stable string form used in the database and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Sad => "sad",
            Emotion::Melancholic => "melancholic",
            Emotion::Nostalgic => "nostalgic",
            Emotion::Lonely => "lonely",
            Emotion::Relaxed => "relaxed",
            Emotion::Focused => "focused",
            Emotion::Hopeful => "hopeful",
            Emotion::RomanticPassionate => "romantic_passionate",
            Emotion::RomanticTender => "romantic_tender",
            Emotion::Party => "party",
            Emotion::Triumphant => "triumphant",
            Emotion::Anxious => "anxious",
            Emotion::Angry => "angry",
            Emotion::Ambiguous => "ambiguous",
        }
    }

    /// Free-text scene description, used only to derive an embedding for
    /// semantic matching. Word-salad on purpose: these are bags of scene
    /// keywords, not prose.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Emotion::Sad => Some("heartbreak crying alone grief loss breakup tears sorrow"),
            Emotion::Melancholic => {
                Some("nostalgic bittersweet longing wistful memories fading away")
            }
            Emotion::Nostalgic => None,
            Emotion::Lonely => Some("isolated empty alone midnight silence abandoned"),
            Emotion::Relaxed => Some("calm peaceful lofi coffee reading sunday morning slow"),
            Emotion::Focused => {
                Some("studying working concentration late night deadline anxious determined")
            }
            Emotion::Hopeful => Some("optimistic bright new beginning sunrise warm gentle"),
            Emotion::RomanticPassionate => {
                Some("falling in love heart racing butterflies first kiss passion")
            }
            Emotion::RomanticTender => {
                Some("slow dance holding hands gentle kiss soft warm intimate")
            }
            Emotion::Party => Some("dancing drinking friends celebration club night out energy"),
            Emotion::Triumphant => {
                Some("victory achievement powerful epic cinematic hero winning")
            }
            Emotion::Anxious => Some("nervous tense worried stressed panic rushing overwhelmed"),
            Emotion::Angry => Some("rage aggressive intense dark heavy metal punk fighting"),
            Emotion::Ambiguous => None,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown emotion label: {0}")]
pub struct UnknownEmotion(pub String);

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .iter()
            .find(|e| e.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}
