use crate::emotion::Emotion;
use crate::features::RawFeatures;

/// A song row joined with its feature row (if any) and persisted label.
#[derive(Debug, Clone)]
pub struct SongRow {
    pub id: i64,
    pub title: String,
    pub features: Option<RawFeatures>,
    pub emotion: Option<Emotion>,
}

/// Library statistics for the `stats` command.
#[derive(Debug)]
pub struct LibraryStats {
    pub total_songs: i64,
    pub with_features: i64,
    pub labeled: i64,
    pub emotions: Vec<(String, i64)>,
}
