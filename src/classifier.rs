//! Discrete emotion classification from raw descriptors.
//!
//! Thresholds are catalog-relative quantiles, not absolute constants: the
//! classifier adapts to the emotional range actually present in the library,
//! so reloading a different catalog can relabel the same song.

use crate::emotion::Emotion;
use crate::features::RawFeatures;

/// Below this, none of the five mood heads is trusted and the song is
/// labeled ambiguous.
const CONFIDENCE_FLOOR: f64 = 0.4;

/// Catalog-wide valence/arousal quantile thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantiles {
    /// 30th percentile of valence.
    pub v_low: f64,
    /// 70th percentile of valence.
    pub v_high: f64,
    /// 30th percentile of arousal.
    pub a_low: f64,
    /// 70th percentile of arousal.
    pub a_high: f64,
    /// 90th percentile of arousal.
    pub a_top: f64,
}

impl Quantiles {
    /// Compute thresholds from the loaded catalog. A degenerate catalog
    /// (zero or one song) collapses every threshold to the single value.
    pub fn from_features(rows: &[RawFeatures]) -> Self {
        let mut valence: Vec<f64> = rows.iter().map(|f| f.valence).collect();
        let mut arousal: Vec<f64> = rows.iter().map(|f| f.arousal).collect();
        valence.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        arousal.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Quantiles {
            v_low: percentile(&valence, 0.30),
            v_high: percentile(&valence, 0.70),
            a_low: percentile(&arousal, 0.30),
            a_high: percentile(&arousal, 0.70),
            a_top: percentile(&arousal, 0.90),
        }
    }
}

/// Linearly interpolated percentile over a sorted slice. Empty input yields
/// 0.0 (the caller only hits this with an empty catalog, where the
/// thresholds are never consulted).
fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let frac = pos - lo as f64;
            if lo + 1 < n {
                sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
            } else {
                sorted[n - 1]
            }
        }
    }
}

/// Map one song's raw descriptors to exactly one emotion label.
///
/// Pure function of (row, quantiles): pick the strongest mood head, then
/// refine with valence/arousal/bpm. The relaxed base gets extra scrutiny
/// because the upstream model is unreliable there — a strongly sad score
/// overrides it.
pub fn classify(f: &RawFeatures, q: &Quantiles) -> Emotion {
    let scores = [
        (Base::Party, f.mood_party),
        (Base::Happy, f.mood_happy),
        (Base::Sad, f.mood_sad),
        (Base::Relaxed, f.mood_relaxed),
        (Base::Aggressive, f.mood_aggressive),
    ];

    let (base, best) = scores
        .iter()
        .fold((Base::Party, f64::NEG_INFINITY), |acc, &(b, s)| {
            if s > acc.1 { (b, s) } else { acc }
        });

    if best < CONFIDENCE_FLOOR {
        return Emotion::Ambiguous;
    }

    let valence = f.valence;
    let arousal = f.arousal;
    let bpm = f.bpm;
    let sad_score = f.mood_sad;

    match base {
        Base::Party => {
            if arousal > q.a_high {
                Emotion::Party
            } else {
                Emotion::Triumphant
            }
        }
        Base::Happy => {
            if valence > q.v_high && arousal > q.a_high {
                Emotion::Hopeful
            } else if valence > q.v_high {
                Emotion::RomanticTender
            } else {
                Emotion::RomanticPassionate
            }
        }
        Base::Sad => {
            if arousal < q.a_low {
                Emotion::Melancholic
            } else if valence < q.v_low {
                Emotion::Lonely
            } else {
                Emotion::Sad
            }
        }
        Base::Relaxed => {
            if sad_score > 0.7 {
                // Strongly sad + relaxed: "relaxed" is not a trustworthy base
                if arousal < q.a_low {
                    Emotion::Melancholic
                } else {
                    Emotion::Sad
                }
            } else if sad_score > 0.5 {
                // Bittersweet zone
                if bpm < 95.0 {
                    Emotion::Nostalgic
                } else {
                    Emotion::Sad
                }
            } else if valence > q.v_high {
                Emotion::Relaxed
            } else if valence < q.v_low {
                Emotion::Melancholic
            } else if bpm < 100.0 {
                Emotion::Nostalgic
            } else {
                Emotion::Focused
            }
        }
        Base::Aggressive => {
            if arousal > q.a_top {
                Emotion::Angry
            } else {
                Emotion::Anxious
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Base {
    Party,
    Happy,
    Sad,
    Relaxed,
    Aggressive,
}
