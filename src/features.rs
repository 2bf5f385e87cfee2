//! Raw acoustic descriptors and the correction + normalization pass that
//! turns them into the [0,1] matrix the ranker works on.

use serde::{Deserialize, Serialize};

/// Number of descriptor columns used for matching.
pub const NUM_FEATURES: usize = 9;

/// Column names in matrix order. The order is fixed — mood profiles and the
/// normalized matrix both index by it.
pub const FEATURE_COLS: [&str; NUM_FEATURES] = [
    "valence",
    "arousal",
    "bpm",
    "mood_happy",
    "mood_sad",
    "mood_aggressive",
    "mood_relaxed",
    "mood_party",
    "danceability",
];

/// Guards min-max denominators against a zero-variance column.
const EPSILON: f64 = 1e-8;

/// How much measured arousal discounts the relaxed score.
const RELAXED_AROUSAL_FACTOR: f64 = 0.6;

/// How much measured arousal discounts the sad score (milder — genuinely sad
/// songs can still have some drive).
const SAD_AROUSAL_FACTOR: f64 = 0.3;

/// Raw per-song descriptors as produced by the upstream audio-tagging
/// pipeline. Valence and arousal are on a 1–9 scale; the five mood
/// probabilities and danceability are in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    pub bpm: f64,
    pub valence: f64,
    pub arousal: f64,
    pub mood_happy: f64,
    pub mood_sad: f64,
    pub mood_aggressive: f64,
    pub mood_relaxed: f64,
    pub mood_party: f64,
    pub danceability: f64,
}

impl RawFeatures {
    /// The five mood-head probabilities, strongest first not guaranteed.
    pub fn mood_scores(&self) -> [f64; 5] {
        [
            self.mood_happy,
            self.mood_sad,
            self.mood_aggressive,
            self.mood_relaxed,
            self.mood_party,
        ]
    }
}

/// Apply bias corrections, then min-max scale every column to [0,1] across
/// the catalog. Returns one row per input song, columns in `FEATURE_COLS`
/// order.
///
/// The upstream mood model over-attributes "relaxed" to orchestral and tense
/// material, so the relaxed score is discounted by aggressiveness and by
/// catalog-relative arousal; the sad score gets a milder arousal discount.
/// Corrections happen before scaling — scaling a corrected column keeps the
/// correction's effect on relative ordering.
pub fn normalize(rows: &[RawFeatures]) -> Vec<[f64; NUM_FEATURES]> {
    if rows.is_empty() {
        return Vec::new();
    }

    // Catalog-relative arousal in [0,1], used only by the corrections.
    let (a_min, a_max) = column_range(rows, |f| f.arousal);
    let arousal_norm: Vec<f64> = rows
        .iter()
        .map(|f| (f.arousal - a_min) / (a_max - a_min + EPSILON))
        .collect();

    let mut matrix: Vec<[f64; NUM_FEATURES]> = rows
        .iter()
        .zip(&arousal_norm)
        .map(|(f, &an)| {
            let relaxed = corrected_relaxed(f.mood_relaxed, f.mood_aggressive, an);
            let sad = corrected_sad(f.mood_sad, an);
            [
                f.valence,
                f.arousal,
                f.bpm,
                f.mood_happy,
                sad,
                f.mood_aggressive,
                relaxed,
                f.mood_party,
                f.danceability,
            ]
        })
        .collect();

    // Per-column min-max over the full catalog.
    for col in 0..NUM_FEATURES {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for row in &matrix {
            min = min.min(row[col]);
            max = max.max(row[col]);
        }
        let denom = max - min + EPSILON;
        for row in &mut matrix {
            row[col] = (row[col] - min) / denom;
        }
    }

    matrix
}

/// Relaxed score discounted by aggressiveness and catalog-relative arousal.
pub fn corrected_relaxed(mood_relaxed: f64, mood_aggressive: f64, arousal_norm: f64) -> f64 {
    mood_relaxed * (1.0 - mood_aggressive) * (1.0 - RELAXED_AROUSAL_FACTOR * arousal_norm)
}

/// Sad score discounted by catalog-relative arousal.
pub fn corrected_sad(mood_sad: f64, arousal_norm: f64) -> f64 {
    mood_sad * (1.0 - SAD_AROUSAL_FACTOR * arousal_norm)
}

fn column_range(rows: &[RawFeatures], get: impl Fn(&RawFeatures) -> f64) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for f in rows {
        let v = get(f);
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}
