use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use moodcue::catalog::{Catalog, EmotionIndex};
use moodcue::classifier::{self, Quantiles};
use moodcue::db::Database;
use moodcue::embedding::HttpEmbedder;
use moodcue::emotion::Emotion;

#[derive(Parser)]
#[command(name = "moodcue", version, about = "Mood-to-music recommender")]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a JSON descriptor table produced by the extraction pipeline
    Import {
        /// Path to the features JSON file
        path: PathBuf,
    },

    /// Classify every song's emotion from its descriptors and persist labels
    Classify,

    /// Match free text to the closest emotion label
    Detect {
        /// Mood or scene description
        text: String,
    },

    /// Recommend songs for a mood or scene description
    Recommend {
        /// Mood or scene description
        text: String,

        /// Number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show library statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = moodcue::config::AppConfig::load();

    // Resolve database path: CLI > config > XDG default
    let db_path = cli
        .db_path
        .or(config.db_path.clone())
        .unwrap_or_else(moodcue::config::default_db_path);
    log::info!("Database: {}", db_path.display());

    let db = Database::open(&db_path).context("Failed to open database")?;

    match cli.command {
        Commands::Import { path } => {
            let result = moodcue::import::import_features(&db, &path).context("Import failed")?;
            println!("Import complete: {} songs", result.imported);
        }

        Commands::Classify => {
            let songs = db.get_all_songs().context("Failed to load songs")?;
            if songs.is_empty() {
                println!("Library is empty. Run `moodcue import` first.");
                return Ok(());
            }

            let featured: Vec<_> = songs.iter().filter_map(|s| s.features).collect();
            let q = Quantiles::from_features(&featured);
            println!(
                "Thresholds: V_HIGH={:.2}  V_LOW={:.2}  A_HIGH={:.2}  A_LOW={:.2}  A_TOP={:.2}",
                q.v_high, q.v_low, q.a_high, q.a_low, q.a_top
            );
            println!();

            let tx = db.conn.unchecked_transaction()?;
            let mut counts: HashMap<Emotion, usize> = HashMap::new();
            let total = songs.len();
            let mut defaulted = 0usize;

            for song in &songs {
                let emotion = match &song.features {
                    Some(f) => classifier::classify(f, &q),
                    None => {
                        defaulted += 1;
                        Emotion::DEFAULT
                    }
                };
                *counts.entry(emotion).or_insert(0) += 1;
                db.set_emotion(song.id, emotion)?;
            }
            tx.commit()?;

            println!("Distribution:");
            let mut dist: Vec<_> = counts.into_iter().collect();
            dist.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.as_str().cmp(b.0.as_str())));
            for (emotion, count) in &dist {
                println!("  {:<20} {}", emotion.as_str(), count);
            }
            println!();
            println!(
                "Classify complete: {} songs across {} emotions ({} without features, defaulted to {})",
                total,
                dist.len(),
                defaulted,
                Emotion::DEFAULT
            );
        }

        Commands::Detect { text } => {
            let embedder = HttpEmbedder::new(
                &config.embedding.endpoint,
                Duration::from_secs(config.embedding.timeout_secs),
            );
            let index = EmotionIndex::build(&embedder)
                .context("Failed to embed emotion descriptions")?;
            let (best, mut scores) = index
                .detect(&embedder, &text)
                .context("Detection failed")?;

            scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            println!("Detected emotion: {best}");
            println!();
            for (emotion, score) in &scores {
                let marker = if *emotion == best { "*" } else { " " };
                println!("  {marker} {:<20} {:.3}", emotion.as_str(), score);
            }
        }

        Commands::Recommend { text, limit } => {
            let songs = db.get_featured_songs().context("Failed to load songs")?;
            if songs.is_empty() {
                println!("No songs with features. Run `moodcue import` first.");
                return Ok(());
            }

            let embedder = HttpEmbedder::new(
                &config.embedding.endpoint,
                Duration::from_secs(config.embedding.timeout_secs),
            );
            let catalog =
                Catalog::build(songs, &embedder).context("Failed to build catalog")?;

            let top_k = limit.or(config.top_k).unwrap_or(5);
            let results = moodcue::ranker::recommend(&catalog, &embedder, &text, top_k)
                .context("Recommendation failed")?;

            if results.is_empty() {
                println!("Please enter a mood description.");
                return Ok(());
            }

            println!("Recommendations for \"{text}\":");
            println!();
            println!("{:<4} {:<35} {:<20} {:>6}", "#", "Song", "Emotion", "Sim");
            println!("{}", "-".repeat(70));
            for (rank, r) in results.iter().enumerate() {
                let title = truncated(&r.title, 35);
                let marker = if r.label_match { "*" } else { " " };
                println!(
                    "{:<4} {:<35} {:<20} {:>6.3} {}",
                    rank + 1,
                    title,
                    r.emotion.as_str(),
                    r.score,
                    marker
                );
            }
            println!();
            println!("* = song's own label matches the detected emotion");
        }

        Commands::Stats => {
            let stats = db.stats().context("Failed to get stats")?;
            println!("Library Statistics");
            println!("==================");
            println!("Total songs:      {}", stats.total_songs);
            println!("With features:    {}", stats.with_features);
            println!("Labeled:          {}", stats.labeled);
            println!();

            if !stats.emotions.is_empty() {
                println!("Emotions:");
                for (emotion, count) in &stats.emotions {
                    println!("  {:<20} {}", emotion, count);
                }
            }
        }
    }

    Ok(())
}

/// Shorten a title to at most `max_chars` characters for table display,
/// cutting on character boundaries so multibyte titles stay valid.
fn truncated(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let cut: String = title.chars().take(max_chars - 3).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_pass_through() {
        assert_eq!(truncated("Neon Nights", 35), "Neon Nights");
    }

    #[test]
    fn long_titles_are_shortened_with_ellipsis() {
        let title = "a".repeat(50);
        let out = truncated(&title, 35);
        assert_eq!(out.chars().count(), 35);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn multibyte_titles_cut_on_character_boundaries() {
        let title = "長い夜の終わりに".repeat(8);
        let out = truncated(&title, 35);
        assert_eq!(out.chars().count(), 35);
        assert!(out.ends_with("..."));
        assert!(out.starts_with("長い夜"));
    }

    #[test]
    fn title_exactly_at_the_limit_is_untouched() {
        let title = "x".repeat(35);
        assert_eq!(truncated(&title, 35), title);
    }
}
