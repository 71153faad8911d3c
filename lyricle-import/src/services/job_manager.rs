//! Bulk import job lifecycle
//!
//! Creating a job persists it as `pending` and spawns a detached task that
//! runs the orchestrator. Callers follow progress by polling the job row.

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use lyricle_common::Result;

use super::bulk_import_orchestrator::BulkImportOrchestrator;
use super::catalog_provider::CatalogProvider;
use super::discovery_engine::DiscoveryEngine;
use super::song_importer::SongImporter;
use crate::config::ImportSettings;
use crate::db::jobs;
use crate::models::{ImportJob, JobParameters, JobStatus};

/// Creates, spawns and looks up bulk import jobs
#[derive(Clone)]
pub struct JobManager {
    db: SqlitePool,
    provider: Arc<dyn CatalogProvider>,
    /// Fixed settings; `None` reads the settings table per job
    settings: Option<ImportSettings>,
}

impl JobManager {
    pub fn new(db: SqlitePool, provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            db,
            provider,
            settings: None,
        }
    }

    /// Use these settings instead of the settings table
    pub fn with_settings(mut self, settings: ImportSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    async fn settings(&self) -> Result<ImportSettings> {
        match &self.settings {
            Some(settings) => Ok(settings.clone()),
            None => ImportSettings::load(&self.db).await,
        }
    }

    /// Validate parameters, persist a pending job and start it in the background
    pub async fn create_job(&self, params: JobParameters) -> Result<Uuid> {
        let params = params.normalized()?;
        let settings = self.settings().await?;

        let job = ImportJob::new(params);
        let job_id = job.id;
        jobs::save_job(&self.db, &job, settings.max_lock_wait_ms).await?;

        info!(
            job_id = %job_id,
            source = %job.params.source,
            requested = job.params.requested_count,
            "Bulk import job created"
        );

        let orchestrator = Arc::new(self.build_orchestrator(settings));
        tokio::spawn(async move {
            info!(job_id = %job_id, "Background bulk import task started");
            orchestrator.run(job_id).await;
            info!(job_id = %job_id, "Background bulk import task finished");
        });

        Ok(job_id)
    }

    fn build_orchestrator(&self, settings: ImportSettings) -> BulkImportOrchestrator {
        let discovery = DiscoveryEngine::new(
            Arc::clone(&self.provider),
            settings.search_delay,
            settings.max_search_limit,
        );
        let importer = SongImporter::new(self.db.clone(), Arc::clone(&self.provider));
        BulkImportOrchestrator::new(self.db.clone(), discovery, importer, settings)
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<Option<ImportJob>> {
        jobs::load_job(&self.db, job_id).await
    }

    /// Newest jobs first; `None` uses the `recent_jobs_limit` setting
    pub async fn list_recent_jobs(&self, limit: Option<u32>) -> Result<Vec<ImportJob>> {
        let limit = match limit {
            Some(limit) => limit,
            None => self.settings().await?.recent_jobs_limit,
        };
        jobs::list_recent_jobs(&self.db, limit).await
    }

    /// Jobs left `running` by a previous process
    ///
    /// Reported only: such jobs are not resumed and their status is left as is.
    pub async fn report_stale_jobs(&self) -> Result<Vec<ImportJob>> {
        let stale = jobs::find_jobs_with_status(&self.db, JobStatus::Running).await?;

        for job in &stale {
            warn!(
                job_id = %job.id,
                processed = job.processed(),
                total_found = job.total_found,
                updated_at = %job.updated_at,
                "Bulk import job was left running by a previous process"
            );
        }

        Ok(stale)
    }
}
