//! Database access for lyricle-import
//!
//! Song/lyric/challenge store plus bulk import job persistence, all on the
//! shared SQLite database created by `lyricle_common::db::init_database`.

pub mod challenges;
pub mod jobs;
pub mod settings;
pub mod songs;

use lyricle_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::debug!("Connecting to database: {}", db_path.display());
    lyricle_common::db::init_database(db_path).await
}
