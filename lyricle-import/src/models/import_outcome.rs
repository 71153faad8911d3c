//! Results of importing a single catalog track

use lyricle_common::db::Song;
use serde::{Deserialize, Serialize};

/// Successful (or benign no-op) result of a single-song import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImportOutcome {
    /// Song and its lyric lines were persisted
    Imported { song: Song, line_count: usize },

    /// A song with this external id already exists
    AlreadyImported,

    /// Same recording (title + artist) already stored under another external id
    Duplicate { existing_song_id: i64 },
}

/// Provisional song found by discovery, not yet imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub external_id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub thumbnail_url: Option<String>,
}
