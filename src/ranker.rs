//! Ranking: continuous similarity to the detected emotion's profile, with a
//! categorical preference for songs whose discrete label agrees.

use rayon::prelude::*;

use crate::catalog::Catalog;
use crate::embedding::{EmbedError, Embedder};
use crate::emotion::Emotion;
use crate::features::NUM_FEATURES;
use crate::profiles;

/// Added to the similarity of label-matching songs before sorting. Far
/// larger than any possible `sim` (which is bounded by 1.0), so matching
/// songs always outrank non-matching ones while `sim` still orders songs
/// within each group. Never reported to the caller.
const LABEL_BOOST: f64 = 100.0;

/// One ranked result. `score` is the un-boosted similarity in (0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub score: f64,
    pub emotion: Emotion,
    pub label_match: bool,
}

/// Recommend the top `top_k` songs for a free-text mood description.
///
/// An empty or whitespace-only query returns an empty list without touching
/// the embedding service. If fewer than `top_k` songs carry the detected
/// label, the remainder is filled with the highest-similarity songs of other
/// labels — the boost is a preference, not a filter.
pub fn recommend(
    catalog: &Catalog,
    embedder: &dyn Embedder,
    query: &str,
    top_k: usize,
) -> Result<Vec<Recommendation>, EmbedError> {
    if query.trim().is_empty() || top_k == 0 || catalog.is_empty() {
        return Ok(Vec::new());
    }

    let (detected, scores) = catalog.detect_emotion(embedder, query)?;
    log::info!(
        "Detected emotion: {} ({:.3})",
        detected,
        scores
            .iter()
            .find(|(e, _)| *e == detected)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    );

    let target = profiles::profile(detected);

    let mut ranked: Vec<(usize, f64, f64)> = catalog
        .matrix()
        .par_iter()
        .enumerate()
        .map(|(i, row)| {
            let sim = euclidean_sim(row, &target);
            debug_assert!(sim <= 1.0, "similarity {sim} exceeds bound");
            let boosted = if catalog.entries()[i].emotion == detected {
                sim + LABEL_BOOST
            } else {
                sim
            };
            (i, sim, boosted)
        })
        .collect();

    ranked.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(top_k);

    Ok(ranked
        .into_iter()
        .map(|(i, sim, _)| {
            let entry = &catalog.entries()[i];
            Recommendation {
                title: entry.title.clone(),
                score: sim,
                emotion: entry.emotion,
                label_match: entry.emotion == detected,
            }
        })
        .collect())
}

/// Similarity in (0, 1], monotonically decreasing in euclidean distance,
/// 1.0 only at an exact match.
fn euclidean_sim(a: &[f64; NUM_FEATURES], b: &[f64; NUM_FEATURES]) -> f64 {
    let dist_sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    1.0 / (1.0 + dist_sq.sqrt())
}
