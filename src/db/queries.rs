use rusqlite::params;

use super::models::{LibraryStats, SongRow};
use super::{Database, Result};
use crate::emotion::Emotion;
use crate::features::RawFeatures;

impl Database {
    /// Insert or refresh a song and its descriptor row. Returns the song id.
    pub fn upsert_song_features(&self, title: &str, f: &RawFeatures) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO songs (title, updated_at) VALUES (?1, datetime('now'))
             ON CONFLICT(title) DO UPDATE SET updated_at = datetime('now')",
            params![title],
        )?;

        let id: i64 = self.conn.query_row(
            "SELECT id FROM songs WHERE title = ?1",
            params![title],
            |row| row.get(0),
        )?;

        self.conn.execute(
            "INSERT INTO features (
                song_id, bpm, valence, arousal,
                mood_happy, mood_sad, mood_aggressive,
                mood_relaxed, mood_party, danceability,
                extracted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, datetime('now'))
            ON CONFLICT(song_id) DO UPDATE SET
                bpm = excluded.bpm,
                valence = excluded.valence,
                arousal = excluded.arousal,
                mood_happy = excluded.mood_happy,
                mood_sad = excluded.mood_sad,
                mood_aggressive = excluded.mood_aggressive,
                mood_relaxed = excluded.mood_relaxed,
                mood_party = excluded.mood_party,
                danceability = excluded.danceability,
                extracted_at = datetime('now')
            ",
            params![
                id,
                f.bpm,
                f.valence,
                f.arousal,
                f.mood_happy,
                f.mood_sad,
                f.mood_aggressive,
                f.mood_relaxed,
                f.mood_party,
                f.danceability,
            ],
        )?;

        Ok(id)
    }

    /// All songs with their optional feature rows and persisted labels,
    /// ordered by title for deterministic iteration.
    pub fn get_all_songs(&self) -> Result<Vec<SongRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.title, s.emotion,
                    f.bpm, f.valence, f.arousal,
                    f.mood_happy, f.mood_sad, f.mood_aggressive,
                    f.mood_relaxed, f.mood_party, f.danceability
             FROM songs s
             LEFT JOIN features f ON f.song_id = s.id
             ORDER BY s.title",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let emotion: Option<String> = row.get(2)?;
                let bpm: Option<f64> = row.get(3)?;
                let features = bpm.map(|bpm| {
                    Ok::<RawFeatures, rusqlite::Error>(RawFeatures {
                        bpm,
                        valence: row.get(4)?,
                        arousal: row.get(5)?,
                        mood_happy: row.get(6)?,
                        mood_sad: row.get(7)?,
                        mood_aggressive: row.get(8)?,
                        mood_relaxed: row.get(9)?,
                        mood_party: row.get(10)?,
                        danceability: row.get(11)?,
                    })
                });
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, emotion, features))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut songs = Vec::with_capacity(rows.len());
        for (id, title, emotion, features) in rows {
            let features = features.transpose()?;
            let emotion = emotion.map(|e| e.parse::<Emotion>()).transpose()?;
            songs.push(SongRow {
                id,
                title,
                features,
                emotion,
            });
        }
        Ok(songs)
    }

    /// Songs that have a feature row, as (title, descriptors) pairs in title
    /// order. This is the catalog the recommendation engine is built from.
    pub fn get_featured_songs(&self) -> Result<Vec<(String, RawFeatures)>> {
        let songs = self.get_all_songs()?;
        Ok(songs
            .into_iter()
            .filter_map(|s| s.features.map(|f| (s.title, f)))
            .collect())
    }

    /// Persist a classified label for one song.
    pub fn set_emotion(&self, song_id: i64, emotion: Emotion) -> Result<()> {
        self.conn.execute(
            "UPDATE songs SET emotion = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![emotion.as_str(), song_id],
        )?;
        Ok(())
    }

    /// Count of songs per persisted label, most common first.
    pub fn emotion_distribution(&self) -> Result<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT emotion, COUNT(*) FROM songs
             WHERE emotion IS NOT NULL
             GROUP BY emotion
             ORDER BY COUNT(*) DESC, emotion",
        )?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    pub fn stats(&self) -> Result<LibraryStats> {
        let total_songs: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
        let with_features: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM features", [], |row| row.get(0))?;
        let labeled: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM songs WHERE emotion IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        let emotions = self.emotion_distribution()?;

        Ok(LibraryStats {
            total_songs,
            with_features,
            labeled,
            emotions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawFeatures {
        RawFeatures {
            bpm: 120.0,
            valence: 6.0,
            arousal: 7.0,
            mood_happy: 0.7,
            mood_sad: 0.1,
            mood_aggressive: 0.1,
            mood_relaxed: 0.2,
            mood_party: 0.8,
            danceability: 0.9,
        }
    }

    #[test]
    fn upsert_is_idempotent_on_title() {
        let db = Database::open_in_memory().unwrap();
        let id1 = db.upsert_song_features("Neon Nights", &sample()).unwrap();
        let mut updated = sample();
        updated.bpm = 124.0;
        let id2 = db.upsert_song_features("Neon Nights", &updated).unwrap();
        assert_eq!(id1, id2);

        let songs = db.get_featured_songs().unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].1.bpm, 124.0);
    }

    #[test]
    fn labels_round_trip_through_the_db() {
        let db = Database::open_in_memory().unwrap();
        let id = db.upsert_song_features("Neon Nights", &sample()).unwrap();
        db.set_emotion(id, Emotion::Party).unwrap();

        let songs = db.get_all_songs().unwrap();
        assert_eq!(songs[0].emotion, Some(Emotion::Party));

        let dist = db.emotion_distribution().unwrap();
        assert_eq!(dist, vec![("party".to_string(), 1)]);
    }

    #[test]
    fn corrupted_label_fails_the_load() {
        let db = Database::open_in_memory().unwrap();
        let id = db.upsert_song_features("Neon Nights", &sample()).unwrap();
        db.conn
            .execute(
                "UPDATE songs SET emotion = 'euphoric' WHERE id = ?1",
                params![id],
            )
            .unwrap();
        assert!(db.get_all_songs().is_err());
    }

    #[test]
    fn stats_counts_features_and_labels() {
        let db = Database::open_in_memory().unwrap();
        let id = db.upsert_song_features("A", &sample()).unwrap();
        db.upsert_song_features("B", &sample()).unwrap();
        db.conn
            .execute("INSERT INTO songs (title) VALUES ('C')", [])
            .unwrap();
        db.set_emotion(id, Emotion::Hopeful).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_songs, 3);
        assert_eq!(stats.with_features, 2);
        assert_eq!(stats.labeled, 1);
    }
}
