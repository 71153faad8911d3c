//! Bulk import job database operations
//!
//! The job row is the durable source of truth for progress; pollers read it
//! while the orchestrator rewrites it after every candidate.

use chrono::{DateTime, SecondsFormat, Utc};
use lyricle_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{ImportJob, JobParameters, JobStatus};
use crate::utils::retry_on_lock;

const JOB_COLUMNS: &str = r#"
    id, source, language, requested_count, challenges_per_song,
    year_from, year_to, search_query, status,
    total_found, imported, skipped, failed, challenges_created,
    log, created_at, updated_at
"#;

/// Save bulk import job (insert or full update)
///
/// Uses retry_on_lock to ride out transient lock contention with other jobs.
pub async fn save_job(pool: &SqlitePool, job: &ImportJob, max_wait_ms: u64) -> Result<()> {
    // Prepare all data BEFORE acquiring database connection
    let id = job.id.to_string();
    let status = job.status.as_str();
    // Fixed-width timestamps keep ORDER BY created_at chronological
    let created_at = job.created_at.to_rfc3339_opts(SecondsFormat::Micros, true);
    let updated_at = job.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true);

    retry_on_lock("save_job", max_wait_ms, || async {
        sqlx::query(
            r#"
            INSERT INTO bulk_import_jobs (
                id, source, language, requested_count, challenges_per_song,
                year_from, year_to, search_query, status,
                total_found, imported, skipped, failed, challenges_created,
                log, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                total_found = excluded.total_found,
                imported = excluded.imported,
                skipped = excluded.skipped,
                failed = excluded.failed,
                challenges_created = excluded.challenges_created,
                log = excluded.log,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&job.params.source)
        .bind(&job.params.language)
        .bind(job.params.requested_count as i64)
        .bind(job.params.challenges_per_song as i64)
        .bind(job.params.year_from)
        .bind(job.params.year_to)
        .bind(&job.params.search_query)
        .bind(status)
        .bind(job.total_found as i64)
        .bind(job.imported as i64)
        .bind(job.skipped as i64)
        .bind(job.failed as i64)
        .bind(job.challenges_created as i64)
        .bind(&job.log)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    })
    .await
}

/// Load bulk import job by id
pub async fn load_job(pool: &SqlitePool, job_id: Uuid) -> Result<Option<ImportJob>> {
    let sql = format!("SELECT {} FROM bulk_import_jobs WHERE id = ?", JOB_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(job_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Most recently created jobs, newest first
pub async fn list_recent_jobs(pool: &SqlitePool, limit: u32) -> Result<Vec<ImportJob>> {
    let sql = format!(
        "SELECT {} FROM bulk_import_jobs ORDER BY created_at DESC LIMIT ?",
        JOB_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(limit as i64).fetch_all(pool).await?;

    rows.iter().map(job_from_row).collect()
}

/// Jobs currently in the given status, oldest first
pub async fn find_jobs_with_status(pool: &SqlitePool, status: JobStatus) -> Result<Vec<ImportJob>> {
    let sql = format!(
        "SELECT {} FROM bulk_import_jobs WHERE status = ? ORDER BY created_at",
        JOB_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(status.as_str()).fetch_all(pool).await?;

    rows.iter().map(job_from_row).collect()
}

/// Mark a non-terminal job failed without rewriting its counters
///
/// Fallback when a full `save_job` of the failed state did not go through.
/// Returns false when the job is missing or already terminal.
pub async fn mark_job_failed(pool: &SqlitePool, job_id: Uuid, message: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE bulk_import_jobs
           SET status = 'failed',
               log = log || ?,
               updated_at = ?
         WHERE id = ? AND status IN ('pending', 'running')
        "#,
    )
    .bind(format!("ERROR: {}\n", message))
    .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
    .bind(job_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn job_from_row(row: &SqliteRow) -> Result<ImportJob> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse job id: {}", e)))?;

    let status: String = row.get("status");

    Ok(ImportJob {
        id,
        params: JobParameters {
            source: row.get("source"),
            language: row.get("language"),
            requested_count: row.get::<i64, _>("requested_count") as u32,
            challenges_per_song: row.get::<i64, _>("challenges_per_song") as u32,
            year_from: row.get("year_from"),
            year_to: row.get("year_to"),
            search_query: row.get("search_query"),
        },
        status: status.parse()?,
        total_found: row.get::<i64, _>("total_found") as u32,
        imported: row.get::<i64, _>("imported") as u32,
        skipped: row.get::<i64, _>("skipped") as u32,
        failed: row.get::<i64, _>("failed") as u32,
        challenges_created: row.get::<i64, _>("challenges_created") as u32,
        log: row.get("log"),
        created_at: parse_timestamp(row.get("created_at"))?,
        updated_at: parse_timestamp(row.get("updated_at"))?,
    })
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp '{}': {}", value, e)))
}
