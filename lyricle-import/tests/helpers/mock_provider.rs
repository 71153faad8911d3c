//! Scripted catalog provider
//!
//! Tracks, search results and failures are registered up front; every call
//! is recorded so tests can assert on queries and limits.

use async_trait::async_trait;
use lyricle_import::error::ProviderError;
use lyricle_import::services::{
    CatalogProvider, LyricsReference, RawLyrics, SearchHit, TrackMetadata,
};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

const LYRICS_PREFIX: &str = "MPLY";

#[derive(Debug, Clone)]
struct MockTrack {
    title: String,
    artist: String,
    lyrics: Option<RawLyrics>,
}

/// In-memory `CatalogProvider` double
#[derive(Default)]
pub struct MockProvider {
    tracks: HashMap<String, MockTrack>,
    search_results: HashMap<String, Vec<SearchHit>>,
    failing_queries: HashSet<String>,
    failing_metadata: HashSet<String>,
    /// Statement run against the pool when metadata for the id is requested
    sabotage: Option<(SqlitePool, String, String)>,
    searches: Mutex<Vec<(String, usize)>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track with plain-text lyrics
    pub fn with_track(mut self, id: &str, title: &str, artist: &str, lines: &[String]) -> Self {
        self.tracks.insert(
            id.to_string(),
            MockTrack {
                title: title.to_string(),
                artist: artist.to_string(),
                lyrics: Some(RawLyrics::Text(lines.join("\n"))),
            },
        );
        self
    }

    /// Track with lyrics in any raw form
    pub fn with_raw_lyrics(mut self, id: &str, title: &str, artist: &str, lyrics: RawLyrics) -> Self {
        self.tracks.insert(
            id.to_string(),
            MockTrack {
                title: title.to_string(),
                artist: artist.to_string(),
                lyrics: Some(lyrics),
            },
        );
        self
    }

    /// Track the provider has no lyrics for
    pub fn with_track_without_lyrics(mut self, id: &str, title: &str, artist: &str) -> Self {
        self.tracks.insert(
            id.to_string(),
            MockTrack {
                title: title.to_string(),
                artist: artist.to_string(),
                lyrics: None,
            },
        );
        self
    }

    pub fn with_search(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.search_results.insert(query.to_string(), hits);
        self
    }

    pub fn with_failing_search(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    pub fn with_failing_metadata(mut self, id: &str) -> Self {
        self.failing_metadata.insert(id.to_string());
        self
    }

    /// Run `sql` against `pool` when metadata for `id` is fetched
    pub fn with_sabotage(mut self, pool: SqlitePool, id: &str, sql: &str) -> Self {
        self.sabotage = Some((pool, id.to_string(), sql.to_string()));
        self
    }

    /// (query, limit) of every search, in call order
    pub fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn searched_queries(&self) -> Vec<String> {
        self.searches().into_iter().map(|(q, _)| q).collect()
    }
}

#[async_trait]
impl CatalogProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        self.searches.lock().unwrap().push((query.to_string(), limit));

        if self.failing_queries.contains(query) {
            return Err(ProviderError::Network("connection reset".to_string()));
        }

        let mut hits = self.search_results.get(query).cloned().unwrap_or_default();
        hits.truncate(limit);
        Ok(hits)
    }

    async fn get_metadata(&self, external_id: &str) -> Result<TrackMetadata, ProviderError> {
        if let Some((pool, id, sql)) = &self.sabotage {
            if id == external_id {
                sqlx::query(sql).execute(pool).await.unwrap();
            }
        }

        if self.failing_metadata.contains(external_id) {
            return Err(ProviderError::Api(500, "internal error".to_string()));
        }

        let track = self
            .tracks
            .get(external_id)
            .ok_or_else(|| ProviderError::NotFound(external_id.to_string()))?;

        Ok(TrackMetadata {
            title: track.title.clone(),
            artist: track.artist.clone(),
            thumbnails: vec![
                format!("https://img/{}/small.jpg", external_id),
                format!("https://img/{}/large.jpg", external_id),
            ],
        })
    }

    async fn get_lyrics_reference(
        &self,
        external_id: &str,
    ) -> Result<Option<LyricsReference>, ProviderError> {
        Ok(self
            .tracks
            .get(external_id)
            .filter(|t| t.lyrics.is_some())
            .map(|_| LyricsReference(format!("{}{}", LYRICS_PREFIX, external_id))))
    }

    async fn get_lyrics(
        &self,
        reference: &LyricsReference,
    ) -> Result<Option<RawLyrics>, ProviderError> {
        let id = reference.0.trim_start_matches(LYRICS_PREFIX);
        Ok(self.tracks.get(id).and_then(|t| t.lyrics.clone()))
    }
}

/// Search hit for a track
pub fn hit(id: &str, title: &str, artist: &str) -> SearchHit {
    SearchHit {
        external_id: Some(id.to_string()),
        title: title.to_string(),
        artists: vec![artist.to_string()],
        album: Some(format!("{} album", artist)),
        thumbnails: vec![format!("https://img/{}.jpg", id)],
    }
}

/// Eight distinct English lyric lines
pub fn english_lyrics() -> Vec<String> {
    [
        "I have been walking down this lonely road for years",
        "Every single night I think about the things you said",
        "And the morning light is coming through the window again",
        "We were young and we believed that love would never end",
        "Now I know that nothing in this world can stay the same",
        "But I will always remember the way you called my name",
        "So take my hand and walk with me into the setting sun",
        "Tomorrow is another day and we have only just begun",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
