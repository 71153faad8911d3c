//! lyricle-import library interface
//!
//! Song import pipeline for the lyric guessing game: catalog discovery,
//! single-song import, challenge selection and background bulk import jobs.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{ImportError, ProviderError};

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::models::ImportOutcome;
use crate::services::{select_challenges, CatalogProvider, JobManager, SongImporter};

/// Shared handles used by every command
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Catalog provider, built once at startup
    pub provider: Arc<dyn CatalogProvider>,
    /// Process start, for log correlation
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            db,
            provider,
            startup_time: Utc::now(),
        }
    }

    pub fn job_manager(&self) -> JobManager {
        JobManager::new(self.db.clone(), Arc::clone(&self.provider))
    }

    pub fn song_importer(&self) -> SongImporter {
        SongImporter::new(self.db.clone(), Arc::clone(&self.provider))
    }

    /// Import one track and create up to `challenges` challenges for it
    ///
    /// Returns the outcome and the number of challenges created (zero for
    /// skipped tracks).
    pub async fn import_song(
        &self,
        external_id: &str,
        language: Option<&str>,
        challenges: u32,
    ) -> Result<(ImportOutcome, usize), ImportError> {
        let outcome = self.song_importer().import(external_id, language).await?;

        let created = match &outcome {
            ImportOutcome::Imported { song, .. } => {
                select_challenges(&self.db, song.id, challenges).await?
            }
            _ => 0,
        };

        Ok((outcome, created))
    }
}
