//! Hand-authored mood profiles: the "ideal" acoustic signature of each
//! emotion label in normalized descriptor space.
//!
//! Values are targets in [0,1], in `FEATURE_COLS` order (valence, arousal,
//! bpm, mood_happy, mood_sad, mood_aggressive, mood_relaxed, mood_party,
//! danceability). Tuned by ear against the catalog, not learned — keep them
//! as data so the ranker stays testable independently of the constants.

use crate::emotion::Emotion;
use crate::features::NUM_FEATURES;

/// Target descriptor vector for one emotion label.
pub type MoodProfile = [f64; NUM_FEATURES];

/// Look up the target vector for a label. Total over the taxonomy, so a
/// detected emotion always has a target.
pub fn profile(emotion: Emotion) -> MoodProfile {
    match emotion {
        Emotion::Sad => [0.15, 0.20, 0.25, 0.05, 0.90, 0.05, 0.50, 0.05, 0.10],
        Emotion::Melancholic => [0.20, 0.15, 0.20, 0.05, 0.85, 0.02, 0.70, 0.02, 0.05],
        Emotion::Nostalgic => [0.35, 0.25, 0.25, 0.20, 0.60, 0.02, 0.70, 0.05, 0.15],
        Emotion::Lonely => [0.15, 0.15, 0.20, 0.05, 0.80, 0.02, 0.60, 0.02, 0.05],
        Emotion::Relaxed => [0.50, 0.12, 0.18, 0.18, 0.15, 0.01, 0.92, 0.05, 0.18],
        Emotion::Focused => [0.40, 0.25, 0.25, 0.15, 0.15, 0.05, 0.70, 0.05, 0.20],
        Emotion::Hopeful => [0.75, 0.60, 0.55, 0.70, 0.05, 0.05, 0.35, 0.40, 0.55],
        Emotion::RomanticPassionate => [0.60, 0.65, 0.50, 0.50, 0.40, 0.05, 0.35, 0.20, 0.60],
        Emotion::RomanticTender => [0.55, 0.35, 0.40, 0.45, 0.50, 0.02, 0.65, 0.10, 0.45],
        Emotion::Party => [0.85, 0.90, 0.75, 0.70, 0.02, 0.15, 0.05, 0.95, 0.95],
        Emotion::Triumphant => [0.50, 0.85, 0.70, 0.20, 0.15, 0.60, 0.05, 0.20, 0.25],
        Emotion::Anxious => [0.25, 0.80, 0.60, 0.05, 0.30, 0.50, 0.05, 0.10, 0.30],
        Emotion::Angry => [0.10, 0.95, 0.85, 0.02, 0.15, 0.95, 0.02, 0.15, 0.35],
        // Neutral middle-of-the-road target for unclassifiable songs
        Emotion::Ambiguous => [0.55, 0.55, 0.55, 0.30, 0.10, 0.10, 0.40, 0.30, 0.50],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_has_a_profile_in_unit_range() {
        for e in Emotion::ALL {
            let p = profile(e);
            for &v in &p {
                assert!((0.0..=1.0).contains(&v), "{e}: {v} out of range");
            }
        }
    }

    #[test]
    fn profiles_are_distinct() {
        for (i, &a) in Emotion::ALL.iter().enumerate() {
            for &b in &Emotion::ALL[i + 1..] {
                assert_ne!(profile(a), profile(b), "{a} and {b} share a profile");
            }
        }
    }

    #[test]
    fn party_profile_is_high_energy() {
        let p = profile(Emotion::Party);
        let sad = profile(Emotion::Sad);
        // arousal (col 1) and mood_party (col 7)
        assert!(p[1] > 0.8 && p[7] > 0.8);
        assert!(sad[1] < 0.3 && sad[4] > 0.8);
    }
}
