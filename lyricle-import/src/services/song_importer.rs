//! Single-song import
//!
//! Fetches one catalog track's metadata and lyrics and persists the song with
//! its lines. Both the bulk import orchestrator and the `import-song` command
//! go through [`SongImporter::import`].

use lyricle_common::db::{NewSong, MIN_LYRIC_LINES};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

use super::catalog_provider::CatalogProvider;
use super::language_detector::detect_language;
use crate::db::songs::{create_song_with_lines, find_song_by_external_id, find_song_by_title_artist};
use crate::error::ImportError;
use crate::models::ImportOutcome;

/// Imports catalog tracks into the song store
pub struct SongImporter {
    db: SqlitePool,
    provider: Arc<dyn CatalogProvider>,
}

impl SongImporter {
    pub fn new(db: SqlitePool, provider: Arc<dyn CatalogProvider>) -> Self {
        Self { db, provider }
    }

    /// Import one track by provider id
    ///
    /// A blank `language_override` is treated as absent and the language is
    /// detected from the lyrics. No retries: provider failures surface as
    /// `ImportError::Provider`.
    pub async fn import(
        &self,
        external_id: &str,
        language_override: Option<&str>,
    ) -> Result<ImportOutcome, ImportError> {
        if find_song_by_external_id(&self.db, external_id).await?.is_some() {
            debug!(external_id = %external_id, "Song already imported");
            return Ok(ImportOutcome::AlreadyImported);
        }

        let metadata = self.provider.get_metadata(external_id).await?;

        if let Some(existing) =
            find_song_by_title_artist(&self.db, &metadata.title, &metadata.artist).await?
        {
            debug!(
                external_id = %external_id,
                existing_song_id = existing.id,
                "Same title and artist already stored"
            );
            return Ok(ImportOutcome::Duplicate {
                existing_song_id: existing.id,
            });
        }

        let reference = self
            .provider
            .get_lyrics_reference(external_id)
            .await?
            .ok_or(ImportError::NoLyricsAvailable)?;

        let lines = self
            .provider
            .get_lyrics(&reference)
            .await?
            .ok_or(ImportError::NoLyricsAvailable)?
            .into_lines();

        if lines.len() < MIN_LYRIC_LINES {
            return Err(ImportError::TooShort { lines: lines.len() });
        }

        let language = match language_override
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
        {
            Some(language) => language,
            None => detect_language(&lines),
        };

        let new_song = NewSong {
            external_id: external_id.to_string(),
            title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            album: None,
            thumbnail_url: metadata.best_thumbnail().map(str::to_string),
            language: Some(language),
        };

        match create_song_with_lines(&self.db, &new_song, &lines).await {
            Ok(song) => {
                info!(
                    external_id = %external_id,
                    song_id = song.id,
                    lines = lines.len(),
                    language = song.language.as_deref().unwrap_or(""),
                    "Imported song"
                );
                Ok(ImportOutcome::Imported {
                    song,
                    line_count: lines.len(),
                })
            }
            // Another job inserted the same track between our check and insert
            Err(e) if e.is_unique_violation() => {
                debug!(external_id = %external_id, "Lost insert race, already imported");
                Ok(ImportOutcome::AlreadyImported)
            }
            Err(e) => Err(ImportError::Store(e)),
        }
    }
}
