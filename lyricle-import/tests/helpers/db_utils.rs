//! Database Test Utilities

use anyhow::Result;
use lyricle_import::models::ImportJob;
use lyricle_import::services::JobManager;
use sqlx::SqlitePool;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

/// Column information from PRAGMA table_info
#[derive(Debug, sqlx::FromRow)]
pub struct ColumnInfo {
    pub cid: i32,
    pub name: String,
    pub r#type: String,
    pub notnull: i32,
    pub dflt_value: Option<String>,
    pub pk: i32,
}

/// Create temporary test database with the full schema
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_lyricle.db");
    let pool = lyricle_import::db::init_database_pool(&db_path).await?;
    Ok((temp_dir, pool))
}

/// Get table schema information
pub async fn get_table_columns(pool: &SqlitePool, table_name: &str) -> Result<Vec<ColumnInfo>> {
    let query = format!("PRAGMA table_info({})", table_name);
    let columns = sqlx::query_as::<_, ColumnInfo>(&query)
        .fetch_all(pool)
        .await?;
    Ok(columns)
}

/// Poll a job until it reaches a terminal status (10 s timeout)
pub async fn wait_for_terminal(manager: &JobManager, job_id: Uuid) -> ImportJob {
    let poll = async {
        loop {
            let job = manager
                .get_job(job_id)
                .await
                .expect("load job")
                .expect("job exists");
            if job.status.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };

    tokio::time::timeout(Duration::from_secs(10), poll)
        .await
        .expect("job did not finish in time")
}
