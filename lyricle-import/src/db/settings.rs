//! Settings database operations
//!
//! Typed accessors over the `settings` key-value table. Defaults written by
//! `lyricle_common::db::init_database` are repeated here so a missing row
//! never stops an import.

use lyricle_common::{Error, Result};
use sqlx::SqlitePool;

pub const IMPORT_SEARCH_DELAY_MS: &str = "import_search_delay_ms";
pub const IMPORT_CANDIDATE_DELAY_MS: &str = "import_candidate_delay_ms";
pub const IMPORT_MAX_SEARCH_LIMIT: &str = "import_max_search_limit";
pub const DATABASE_MAX_LOCK_WAIT_MS: &str = "database_max_lock_wait_ms";
pub const RECENT_JOBS_LIMIT: &str = "recent_jobs_limit";

/// Pause between discovery searches
///
/// **Default:** 500 ms
pub async fn get_import_search_delay_ms(db: &SqlitePool) -> Result<u64> {
    get_setting(db, IMPORT_SEARCH_DELAY_MS).await.map(|opt| opt.unwrap_or(500))
}

/// Pause between candidate imports
///
/// **Default:** 1000 ms
pub async fn get_import_candidate_delay_ms(db: &SqlitePool) -> Result<u64> {
    get_setting(db, IMPORT_CANDIDATE_DELAY_MS).await.map(|opt| opt.unwrap_or(1000))
}

/// Upper bound on the per-search result limit
///
/// **Default:** 50
pub async fn get_import_max_search_limit(db: &SqlitePool) -> Result<usize> {
    get_setting(db, IMPORT_MAX_SEARCH_LIMIT).await.map(|opt| opt.unwrap_or(50))
}

/// Longest time a job progress write retries on lock contention
///
/// **Default:** 5000 ms
pub async fn get_database_max_lock_wait_ms(db: &SqlitePool) -> Result<u64> {
    get_setting(db, DATABASE_MAX_LOCK_WAIT_MS).await.map(|opt| opt.unwrap_or(5000))
}

/// Default number of jobs listed by `jobs list`
///
/// **Default:** 20
pub async fn get_recent_jobs_limit(db: &SqlitePool) -> Result<u32> {
    get_setting(db, RECENT_JOBS_LIMIT).await.map(|opt| opt.unwrap_or(20))
}

/// Generic setting getter
pub async fn get_setting<T>(db: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lyricle_common::db::get_setting(db, key).await? {
        Some(value) => {
            let parsed = value
                .trim()
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting '{}' failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Generic setting setter
pub async fn set_setting<T>(db: &SqlitePool, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    lyricle_common::db::set_setting(db, key, &value.to_string()).await
}
