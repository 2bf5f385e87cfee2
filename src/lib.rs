pub mod catalog;
pub mod classifier;
pub mod config;
pub mod db;
pub mod embedding;
pub mod emotion;
pub mod features;
pub mod import;
pub mod profiles;
pub mod ranker;

/// Application name for XDG paths
pub const APP_NAME: &str = "moodcue";
