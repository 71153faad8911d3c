//! Runtime configuration for lyricle-import
//!
//! Bootstrap settings (root folder, provider endpoint, log level) come from
//! TOML via `lyricle_common::config`. Pacing and limits that an operator may
//! tune between runs live in the `settings` table and are read once per job.

use lyricle_common::Result;
use sqlx::SqlitePool;
use std::time::Duration;

use crate::db::settings;

/// Runtime settings used by discovery, the orchestrator and job persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    /// Pause between two discovery searches
    pub search_delay: Duration,
    /// Pause between two candidate imports
    pub candidate_delay: Duration,
    /// Cap on the result limit passed to a single search
    pub max_search_limit: usize,
    /// Retry budget for job writes hitting a locked database
    pub max_lock_wait_ms: u64,
    /// Default length of the recent jobs listing
    pub recent_jobs_limit: u32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            search_delay: Duration::from_millis(500),
            candidate_delay: Duration::from_millis(1000),
            max_search_limit: 50,
            max_lock_wait_ms: 5000,
            recent_jobs_limit: 20,
        }
    }
}

impl ImportSettings {
    /// Load settings from the database, defaulting missing keys
    pub async fn load(db: &SqlitePool) -> Result<Self> {
        let loaded = Self {
            search_delay: Duration::from_millis(settings::get_import_search_delay_ms(db).await?),
            candidate_delay: Duration::from_millis(
                settings::get_import_candidate_delay_ms(db).await?,
            ),
            max_search_limit: settings::get_import_max_search_limit(db).await?.max(1),
            max_lock_wait_ms: settings::get_database_max_lock_wait_ms(db).await?,
            recent_jobs_limit: settings::get_recent_jobs_limit(db).await?,
        };

        tracing::debug!(?loaded, "Import settings loaded");
        Ok(loaded)
    }

    /// Settings without pauses, for tests and scripted providers
    pub fn without_delays() -> Self {
        Self {
            search_delay: Duration::ZERO,
            candidate_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_matches_initialized_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let pool = lyricle_common::db::init_database(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        let loaded = ImportSettings::load(&pool).await.unwrap();
        assert_eq!(loaded, ImportSettings::default());
    }

    #[tokio::test]
    async fn test_load_reads_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let pool = lyricle_common::db::init_database(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        settings::set_setting(&pool, settings::IMPORT_SEARCH_DELAY_MS, 0u64).await.unwrap();
        settings::set_setting(&pool, settings::IMPORT_MAX_SEARCH_LIMIT, 0usize).await.unwrap();

        let loaded = ImportSettings::load(&pool).await.unwrap();
        assert_eq!(loaded.search_delay, Duration::ZERO);
        // Zero limit would make every search empty
        assert_eq!(loaded.max_search_limit, 1);
    }
}
