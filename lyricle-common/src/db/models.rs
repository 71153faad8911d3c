//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum number of lyric lines a song must have to be stored
pub const MIN_LYRIC_LINES: usize = 6;

/// Imported song (one catalog track)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub id: i64,
    /// Catalog provider track id (globally unique)
    pub external_id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Language code, `"unknown"` when detection abstained
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Song fields supplied at creation time
#[derive(Debug, Clone, Default)]
pub struct NewSong {
    pub external_id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub thumbnail_url: Option<String>,
    pub language: Option<String>,
}

/// One lyric line; `line_number` is zero-based and contiguous per song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LyricLine {
    pub id: i64,
    pub song_id: i64,
    pub line_number: i64,
    pub text: String,
}

/// A lyric window `[start_line, end_line]` presented as a puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Challenge {
    pub id: i64,
    pub song_id: i64,
    pub start_line: i64,
    pub end_line: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Normalized form used for title/artist duplicate detection
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}
