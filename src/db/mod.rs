pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::emotion::UnknownEmotion;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    // The taxonomy is closed; a label we can't parse means corrupted data.
    #[error("invalid emotion label in database: {0}")]
    BadLabel(#[from] UnknownEmotion),
}

pub type Result<T> = std::result::Result<T, DbError>;

pub struct Database {
    pub conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        // WAL mode for better concurrent read performance
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        self.migrate()?;
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if version < 1 {
            self.migrate_v1()?;
        }

        self.conn.pragma_update(None, "user_version", 1)?;
        Ok(())
    }

    /// V1: songs + their extracted descriptors
    fn migrate_v1(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS songs (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL UNIQUE,

                -- Discrete label from the classifier (null until classified)
                emotion     TEXT,

                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_songs_emotion ON songs(emotion);

            CREATE TABLE IF NOT EXISTS features (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                song_id         INTEGER NOT NULL UNIQUE REFERENCES songs(id) ON DELETE CASCADE,

                bpm             REAL NOT NULL,
                valence         REAL NOT NULL,
                arousal         REAL NOT NULL,
                mood_happy      REAL NOT NULL,
                mood_sad        REAL NOT NULL,
                mood_aggressive REAL NOT NULL,
                mood_relaxed    REAL NOT NULL,
                mood_party      REAL NOT NULL,
                danceability    REAL NOT NULL,

                extracted_at    TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_features_song ON features(song_id);
            ",
        )?;
        Ok(())
    }
}
