//! Catalog provider abstraction
//!
//! The discovery engine and song importer talk to the streaming catalog only
//! through this trait. The provider is built once at startup and shared as
//! `Arc<dyn CatalogProvider>`, which lets tests substitute a scripted double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// One keyword search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Provider track id; hits without one cannot be imported
    pub external_id: Option<String>,
    pub title: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    /// Thumbnail URLs, smallest first
    pub thumbnails: Vec<String>,
}

impl SearchHit {
    /// Artist credit as displayed ("A, B")
    pub fn artist_display(&self) -> String {
        self.artists.join(", ")
    }

    /// Largest available thumbnail
    pub fn best_thumbnail(&self) -> Option<&str> {
        self.thumbnails.last().map(String::as_str)
    }
}

/// Track metadata used when persisting a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    /// Thumbnail URLs, smallest first
    pub thumbnails: Vec<String>,
}

impl TrackMetadata {
    pub fn best_thumbnail(&self) -> Option<&str> {
        self.thumbnails.last().map(String::as_str)
    }
}

/// Opaque handle to a track's lyrics on the provider side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsReference(pub String);

/// One line of time-synced lyrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedLine {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Lyrics as returned by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawLyrics {
    /// Newline-separated plain text
    Text(String),
    /// Time-synced line objects
    Timed(Vec<TimedLine>),
}

impl RawLyrics {
    /// Normalize into ordered non-blank text lines
    pub fn into_lines(self) -> Vec<String> {
        match self {
            RawLyrics::Text(text) => text
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
            RawLyrics::Timed(lines) => lines
                .into_iter()
                .map(|l| l.text)
                .filter(|t| !t.trim().is_empty())
                .collect(),
        }
    }
}

/// Streaming catalog: search, metadata and lyrics
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Keyword search restricted to songs
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError>;

    /// Metadata for one track
    async fn get_metadata(&self, external_id: &str) -> Result<TrackMetadata, ProviderError>;

    /// Lyrics handle for a track, `None` when the provider has no lyrics
    async fn get_lyrics_reference(
        &self,
        external_id: &str,
    ) -> Result<Option<LyricsReference>, ProviderError>;

    /// Lyrics content, `None` when the handle resolves to nothing
    async fn get_lyrics(&self, reference: &LyricsReference)
        -> Result<Option<RawLyrics>, ProviderError>;
}
