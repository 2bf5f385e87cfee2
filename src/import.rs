//! Descriptor-table ingest.
//!
//! The feature extraction pipeline is external — it hands over a JSON array
//! of per-song descriptor records, which this module loads into the catalog
//! database.

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use crate::db::Database;
use crate::features::RawFeatures;

/// One record of the import file.
#[derive(Debug, Deserialize)]
pub struct ImportRecord {
    pub title: String,
    #[serde(flatten)]
    pub features: RawFeatures,
}

pub struct ImportResult {
    pub imported: usize,
}

/// Load a JSON descriptor table and upsert every record.
pub fn import_features(db: &Database, path: &Path) -> Result<ImportResult> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<ImportRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if records.is_empty() {
        log::warn!("{} contains no records", path.display());
        return Ok(ImportResult { imported: 0 });
    }

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} songs")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut imported = 0;
    for record in &records {
        db.upsert_song_features(&record.title, &record.features)
            .with_context(|| format!("Failed to store \"{}\"", record.title))?;
        imported += 1;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    Ok(ImportResult { imported })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_record_parses_flat_json() {
        let json = r#"{
            "title": "Neon Nights",
            "bpm": 124.0,
            "valence": 6.5,
            "arousal": 7.2,
            "mood_happy": 0.8,
            "mood_sad": 0.05,
            "mood_aggressive": 0.1,
            "mood_relaxed": 0.1,
            "mood_party": 0.9,
            "danceability": 0.95
        }"#;
        let record: ImportRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Neon Nights");
        assert_eq!(record.features.bpm, 124.0);
        assert_eq!(record.features.mood_party, 0.9);
    }
}
