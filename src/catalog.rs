//! The immutable recommendation catalog.
//!
//! Built once at load: raw descriptors are classified and normalized, and
//! the emotion descriptions are embedded and cached. After `build` returns,
//! nothing here is ever mutated — queries are read-only, so the catalog can
//! be shared freely across threads.

use crate::classifier::{self, Quantiles};
use crate::embedding::{EmbedError, Embedder, cosine_similarity};
use crate::emotion::Emotion;
use crate::features::{self, NUM_FEATURES, RawFeatures};

/// One cataloged song with its classified label.
#[derive(Debug, Clone)]
pub struct SongEntry {
    pub title: String,
    pub raw: RawFeatures,
    pub emotion: Emotion,
}

/// Cached embeddings of the emotion descriptions, one per detectable label.
pub struct EmotionIndex {
    embeddings: Vec<(Emotion, Vec<f32>)>,
}

impl EmotionIndex {
    /// Embed every emotion description once. Call at load time; the result
    /// is reused for the process lifetime.
    pub fn build(embedder: &dyn Embedder) -> Result<Self, EmbedError> {
        let mut embeddings = Vec::with_capacity(Emotion::DETECTABLE.len());
        for e in Emotion::DETECTABLE {
            let desc = e
                .description()
                .expect("detectable emotion without a description");
            embeddings.push((e, embedder.embed(desc)?));
        }
        log::debug!("Embedded {} emotion descriptions", embeddings.len());
        Ok(Self { embeddings })
    }

    /// Match free text to the closest emotion label. Returns the winner plus
    /// the full per-label score map for diagnostics.
    ///
    /// Ties go to the label declared earlier in the taxonomy (strict `>`
    /// while scanning in order), so the result never depends on map
    /// iteration order.
    pub fn detect(
        &self,
        embedder: &dyn Embedder,
        text: &str,
    ) -> Result<(Emotion, Vec<(Emotion, f32)>), EmbedError> {
        let query = embedder.embed(text)?;

        let scores: Vec<(Emotion, f32)> = self
            .embeddings
            .iter()
            .map(|(e, emb)| (*e, cosine_similarity(&query, emb)))
            .collect();

        let mut best = scores[0];
        for &(e, s) in &scores[1..] {
            if s > best.1 {
                best = (e, s);
            }
        }

        Ok((best.0, scores))
    }
}

pub struct Catalog {
    entries: Vec<SongEntry>,
    matrix: Vec<[f64; NUM_FEATURES]>,
    quantiles: Quantiles,
    index: EmotionIndex,
}

impl Catalog {
    /// Build the catalog from (title, descriptors) pairs: compute quantile
    /// thresholds, classify every song, normalize the descriptor matrix, and
    /// cache the emotion-description embeddings.
    pub fn build(
        songs: Vec<(String, RawFeatures)>,
        embedder: &dyn Embedder,
    ) -> Result<Self, EmbedError> {
        let raws: Vec<RawFeatures> = songs.iter().map(|(_, f)| *f).collect();
        let quantiles = Quantiles::from_features(&raws);
        let matrix = features::normalize(&raws);

        let entries: Vec<SongEntry> = songs
            .into_iter()
            .map(|(title, raw)| SongEntry {
                title,
                emotion: classifier::classify(&raw, &quantiles),
                raw,
            })
            .collect();

        let index = EmotionIndex::build(embedder)?;

        log::info!("Catalog ready: {} songs", entries.len());
        Ok(Self {
            entries,
            matrix,
            quantiles,
            index,
        })
    }

    /// Assemble a catalog from precomputed parts. Intended for synthetic
    /// catalogs in tests; `build` is the normal path.
    pub fn from_parts(
        entries: Vec<SongEntry>,
        matrix: Vec<[f64; NUM_FEATURES]>,
        quantiles: Quantiles,
        index: EmotionIndex,
    ) -> Self {
        assert_eq!(entries.len(), matrix.len());
        Self {
            entries,
            matrix,
            quantiles,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SongEntry] {
        &self.entries
    }

    pub fn matrix(&self) -> &[[f64; NUM_FEATURES]] {
        &self.matrix
    }

    pub fn quantiles(&self) -> &Quantiles {
        &self.quantiles
    }

    pub fn emotion_index(&self) -> &EmotionIndex {
        &self.index
    }

    /// Map free text to the closest emotion label (see [`EmotionIndex::detect`]).
    pub fn detect_emotion(
        &self,
        embedder: &dyn Embedder,
        text: &str,
    ) -> Result<(Emotion, Vec<(Emotion, f32)>), EmbedError> {
        self.index.detect(embedder, text)
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::collections::HashMap;

    /// Deterministic embedder for tests: exact text → fixed vector.
    pub struct StubEmbedder {
        map: HashMap<String, Vec<f32>>,
    }

    impl StubEmbedder {
        pub fn new() -> Self {
            Self {
                map: HashMap::new(),
            }
        }

        pub fn with(mut self, text: &str, vec: Vec<f32>) -> Self {
            self.map.insert(text.to_string(), vec);
            self
        }

        /// Map every emotion description onto its own axis.
        pub fn with_description_axes(mut self) -> Self {
            for (i, e) in Emotion::DETECTABLE.iter().enumerate() {
                self.map
                    .insert(e.description().unwrap().to_string(), axis(i));
            }
            self
        }
    }

    impl Embedder for StubEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            self.map
                .get(text)
                .cloned()
                .ok_or_else(|| EmbedError::Request(format!("no stub embedding for {text:?}")))
        }
    }

    /// Unit vector along one of the 12 detectable-emotion axes.
    pub fn axis(i: usize) -> Vec<f32> {
        let mut v = vec![0.0; Emotion::DETECTABLE.len()];
        v[i] = 1.0;
        v
    }

    /// Embedder that always fails, for error-propagation tests.
    pub struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Err(EmbedError::Request("connection refused".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stub::{FailingEmbedder, StubEmbedder, axis};
    use super::*;

    fn det_index(e: Emotion) -> usize {
        Emotion::DETECTABLE.iter().position(|&x| x == e).unwrap()
    }

    #[test]
    fn detect_picks_the_closest_description() {
        let embedder = StubEmbedder::new()
            .with_description_axes()
            .with("I want to dance all night", axis(det_index(Emotion::Party)));
        let index = EmotionIndex::build(&embedder).unwrap();

        let (best, scores) = index.detect(&embedder, "I want to dance all night").unwrap();
        assert_eq!(best, Emotion::Party);
        assert_eq!(scores.len(), Emotion::DETECTABLE.len());
        let party_score = scores
            .iter()
            .find(|(e, _)| *e == Emotion::Party)
            .unwrap()
            .1;
        assert!((party_score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn detect_ties_break_by_taxonomy_order() {
        // Query equidistant from sad and melancholic — sad is declared first.
        let mut query = vec![0.0_f32; Emotion::DETECTABLE.len()];
        query[det_index(Emotion::Sad)] = 1.0;
        query[det_index(Emotion::Melancholic)] = 1.0;

        let embedder = StubEmbedder::new()
            .with_description_axes()
            .with("bittersweet", query);
        let index = EmotionIndex::build(&embedder).unwrap();

        let (best, _) = index.detect(&embedder, "bittersweet").unwrap();
        assert_eq!(best, Emotion::Sad);
    }

    #[test]
    fn embedding_failure_propagates() {
        assert!(EmotionIndex::build(&FailingEmbedder).is_err());
    }

    #[test]
    fn build_classifies_and_normalizes_every_song() {
        let embedder = StubEmbedder::new().with_description_axes();

        let party_song = RawFeatures {
            bpm: 128.0,
            valence: 8.0,
            arousal: 8.5,
            mood_happy: 0.6,
            mood_sad: 0.02,
            mood_aggressive: 0.1,
            mood_relaxed: 0.05,
            mood_party: 0.95,
            danceability: 0.95,
        };
        let quiet_song = RawFeatures {
            bpm: 72.0,
            valence: 2.0,
            arousal: 2.0,
            mood_happy: 0.05,
            mood_sad: 0.9,
            mood_aggressive: 0.02,
            mood_relaxed: 0.4,
            mood_party: 0.02,
            danceability: 0.1,
        };
        let middle_song = RawFeatures {
            bpm: 100.0,
            valence: 5.0,
            arousal: 5.0,
            mood_happy: 0.3,
            mood_sad: 0.3,
            mood_aggressive: 0.1,
            mood_relaxed: 0.3,
            mood_party: 0.2,
            danceability: 0.5,
        };

        let catalog = Catalog::build(
            vec![
                ("Confetti".into(), party_song),
                ("Empty Rooms".into(), quiet_song),
                ("Weekday".into(), middle_song),
            ],
            &embedder,
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.entries()[0].emotion, Emotion::Party);
        // All five mood heads below the confidence floor
        assert_eq!(catalog.entries()[2].emotion, Emotion::Ambiguous);
        for row in catalog.matrix() {
            for &v in row {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
