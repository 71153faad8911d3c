//! Bulk import orchestration
//!
//! Drives one job from `pending` to a terminal state:
//! 1. mark running and clear the log
//! 2. discover candidates
//! 3. import candidates one at a time, creating challenges for each new song
//! 4. mark completed with a summary, or failed with the escaping error
//!
//! The job row is rewritten after every step so pollers see live counters.
//! Runs detached from any caller, so nothing is returned: outcomes are only
//! visible through the job row and tracing output.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::discovery_engine::{DiscoveryEngine, DiscoveryRequest};
use super::snippet_selector::select_challenges;
use super::song_importer::SongImporter;
use crate::config::ImportSettings;
use crate::db::jobs::{load_job, mark_job_failed, save_job};
use crate::error::ImportError;
use crate::models::{Candidate, ImportJob, ImportOutcome, JobStatus};

/// Runs bulk import jobs
pub struct BulkImportOrchestrator {
    db: SqlitePool,
    discovery: DiscoveryEngine,
    importer: SongImporter,
    settings: ImportSettings,
}

impl BulkImportOrchestrator {
    pub fn new(
        db: SqlitePool,
        discovery: DiscoveryEngine,
        importer: SongImporter,
        settings: ImportSettings,
    ) -> Self {
        Self {
            db,
            discovery,
            importer,
            settings,
        }
    }

    /// Run a job to completion; never returns an error
    pub async fn run(&self, job_id: Uuid) {
        let mut job = match load_job(&self.db, job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                error!(job_id = %job_id, "Bulk import job not found");
                return;
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Failed to load bulk import job");
                return;
            }
        };

        // Jobs are never reopened or run twice
        if job.status != JobStatus::Pending {
            warn!(job_id = %job_id, status = %job.status, "Bulk import job is not pending");
            return;
        }

        if let Err(e) = self.start(&mut job).await {
            error!(job_id = %job_id, error = %e, "Failed to start bulk import job");
            self.fail(&mut job, &e.to_string()).await;
            return;
        }

        match self.execute(&mut job).await {
            Ok(()) => self.complete(&mut job).await,
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Bulk import job failed");
                self.fail(&mut job, &e.to_string()).await;
            }
        }
    }

    async fn start(&self, job: &mut ImportJob) -> lyricle_common::Result<()> {
        job.transition_to(JobStatus::Running)?;
        job.log.clear();
        self.persist(job).await?;

        info!(
            job_id = %job.id,
            source = %job.params.source,
            language = job.params.language.as_deref().unwrap_or("any"),
            requested = job.params.requested_count,
            "Bulk import job running"
        );
        Ok(())
    }

    /// Discovery then the per-candidate loop
    ///
    /// Only store failures escape; candidate failures become counters.
    async fn execute(&self, job: &mut ImportJob) -> lyricle_common::Result<()> {
        job.append_log(format!("Discovering songs from {}...", job.params.source));
        self.persist(job).await?;

        let request = DiscoveryRequest {
            language: job.params.language.clone(),
            count: job.params.requested_count as usize,
            year_from: job.params.year_from,
            year_to: job.params.year_to,
            search_query: job.params.search_query.clone(),
        };
        let candidates = self.discovery.discover(&request).await;

        job.total_found = candidates.len() as u32;
        job.append_log(format!("Found {} candidates", candidates.len()));
        self.persist(job).await?;

        let total = candidates.len();
        for (index, candidate) in candidates.iter().enumerate() {
            if index > 0 && !self.settings.candidate_delay.is_zero() {
                tokio::time::sleep(self.settings.candidate_delay).await;
            }

            let prefix = format!("[{}/{}]", index + 1, total);
            self.import_candidate(job, candidate, &prefix).await?;
            self.persist(job).await?;
        }

        Ok(())
    }

    async fn import_candidate(
        &self,
        job: &mut ImportJob,
        candidate: &Candidate,
        prefix: &str,
    ) -> lyricle_common::Result<()> {
        let outcome = self
            .importer
            .import(&candidate.external_id, job.params.language.as_deref())
            .await;

        match outcome {
            Ok(ImportOutcome::Imported { song, line_count }) => {
                job.imported += 1;
                job.append_log(format!(
                    "{} Imported: {} ({} lines)",
                    prefix, candidate.title, line_count
                ));

                let created =
                    select_challenges(&self.db, song.id, job.params.challenges_per_song).await?;
                job.challenges_created += created as u32;
            }
            Ok(ImportOutcome::AlreadyImported) => {
                job.skipped += 1;
                job.append_log(format!("{} Skipped (exists): {}", prefix, candidate.title));
            }
            Ok(ImportOutcome::Duplicate { .. }) => {
                job.skipped += 1;
                job.append_log(format!("{} Skipped (duplicate): {}", prefix, candidate.title));
            }
            Err(e) if !e.is_candidate_failure() => return Err(e.into()),
            Err(e) => {
                job.failed += 1;
                job.append_log(format!(
                    "{} {}",
                    prefix,
                    failure_line(&e, &candidate.title)
                ));
                warn!(
                    job_id = %job.id,
                    external_id = %candidate.external_id,
                    error = %e,
                    "Candidate import failed"
                );
            }
        }

        Ok(())
    }

    async fn complete(&self, job: &mut ImportJob) {
        if let Err(e) = job.transition_to(JobStatus::Completed) {
            error!(job_id = %job.id, error = %e, "Cannot complete bulk import job");
            return;
        }
        let summary = job.summary();
        job.append_log(&summary);

        match self.persist(job).await {
            Ok(()) => info!(job_id = %job.id, "{}", summary),
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Failed to persist completed job");
                self.fail(job, &e.to_string()).await;
            }
        }
    }

    /// Record a terminal failure, falling back to a direct status update
    async fn fail(&self, job: &mut ImportJob, message: &str) {
        if job.status.is_terminal() {
            // Completed in memory but not on disk; only the fallback applies
            self.fail_fallback(job.id, message).await;
            return;
        }

        if let Err(e) = job.transition_to(JobStatus::Failed) {
            error!(job_id = %job.id, error = %e, "Cannot mark bulk import job failed");
            return;
        }
        job.append_log(format!("ERROR: {}", message));

        if let Err(e) = self.persist(job).await {
            error!(
                job_id = %job.id,
                error = %e,
                "Failed to persist failed job - attempting direct database update"
            );
            self.fail_fallback(job.id, message).await;
        }
    }

    async fn fail_fallback(&self, job_id: Uuid, message: &str) {
        match mark_job_failed(&self.db, job_id, message).await {
            Ok(true) => warn!(job_id = %job_id, "Job marked failed by direct update"),
            Ok(false) => warn!(job_id = %job_id, "Job already terminal or missing"),
            Err(e) => error!(job_id = %job_id, error = %e, "Direct failure update failed"),
        }
    }

    async fn persist(&self, job: &mut ImportJob) -> lyricle_common::Result<()> {
        job.updated_at = Utc::now();
        save_job(&self.db, job, self.settings.max_lock_wait_ms).await
    }
}

/// Job log text for a per-candidate failure
fn failure_line(error: &ImportError, title: &str) -> String {
    match error {
        ImportError::NoLyricsAvailable => format!("No lyrics: {}", title),
        ImportError::TooShort { lines } => format!("Too short: {} ({} lines)", title, lines),
        other => format!("Failed: {} ({})", title, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn test_failure_lines() {
        assert_eq!(failure_line(&ImportError::NoLyricsAvailable, "Song"), "No lyrics: Song");
        assert_eq!(
            failure_line(&ImportError::TooShort { lines: 4 }, "Song"),
            "Too short: Song (4 lines)"
        );
        assert_eq!(
            failure_line(&ImportError::Provider(ProviderError::RateLimited), "Song"),
            "Failed: Song (Provider error: Rate limit exceeded)"
        );
    }
}
