//! Bulk import job state machine
//!
//! `pending → running → {completed, failed}`. Terminal states are absorbing;
//! a job is never reopened.

use chrono::{DateTime, Utc};
use lyricle_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Only catalog source currently wired to a provider
pub const SOURCE_YTMUSIC: &str = "ytmusic";

/// Upper bound on `requested_count`
pub const MAX_REQUESTED_COUNT: u32 = 500;

/// Upper bound on `challenges_per_song`
pub const MAX_CHALLENGES_PER_SONG: u32 = 10;

/// Job status as stored in `bulk_import_jobs.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Allowed edges of the job state machine
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(Error::Internal(format!("Unknown job status: {}", other))),
        }
    }
}

/// Input parameters of a bulk import job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParameters {
    pub source: String,
    pub language: Option<String>,
    pub requested_count: u32,
    pub challenges_per_song: u32,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub search_query: Option<String>,
}

impl Default for JobParameters {
    fn default() -> Self {
        Self {
            source: SOURCE_YTMUSIC.to_string(),
            language: None,
            requested_count: 50,
            challenges_per_song: 1,
            year_from: None,
            year_to: None,
            search_query: None,
        }
    }
}

impl JobParameters {
    /// Validate and normalize parameters before a job is created
    ///
    /// Lowercases the language, drops blank optional strings and rejects
    /// unknown sources, out-of-range counts and reversed year bounds.
    pub fn normalized(mut self) -> Result<Self> {
        self.source = self.source.trim().to_lowercase();
        if self.source != SOURCE_YTMUSIC {
            return Err(Error::InvalidInput(format!(
                "Unsupported source '{}' (supported: {})",
                self.source, SOURCE_YTMUSIC
            )));
        }

        self.language = self
            .language
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty());
        self.search_query = self
            .search_query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        if self.requested_count == 0 || self.requested_count > MAX_REQUESTED_COUNT {
            return Err(Error::InvalidInput(format!(
                "count must be between 1 and {}",
                MAX_REQUESTED_COUNT
            )));
        }

        if self.challenges_per_song > MAX_CHALLENGES_PER_SONG {
            return Err(Error::InvalidInput(format!(
                "challenges_per_song must be at most {}",
                MAX_CHALLENGES_PER_SONG
            )));
        }

        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from > to {
                return Err(Error::InvalidInput(format!(
                    "year_from ({}) is after year_to ({})",
                    from, to
                )));
            }
        }

        Ok(self)
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub job_id: Uuid,
    pub old_status: JobStatus,
    pub new_status: JobStatus,
    pub transitioned_at: DateTime<Utc>,
}

/// One bulk-import run with its parameters, counters and log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: Uuid,
    pub params: JobParameters,
    pub status: JobStatus,
    pub total_found: u32,
    pub imported: u32,
    pub skipped: u32,
    pub failed: u32,
    pub challenges_created: u32,
    /// Newline-delimited, append-only operator log
    pub log: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportJob {
    /// Create new job in `pending`
    pub fn new(params: JobParameters) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            params,
            status: JobStatus::Pending,
            total_found: 0,
            imported: 0,
            skipped: 0,
            failed: 0,
            challenges_created: 0,
            log: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to new status, enforcing the state machine
    pub fn transition_to(&mut self, new_status: JobStatus) -> Result<StateTransition> {
        if !self.status.can_transition_to(new_status) {
            return Err(Error::InvalidInput(format!(
                "Job {} cannot move from {} to {}",
                self.id, self.status, new_status
            )));
        }

        let transition = StateTransition {
            job_id: self.id,
            old_status: self.status,
            new_status,
            transitioned_at: Utc::now(),
        };
        self.status = new_status;
        self.updated_at = transition.transitioned_at;

        Ok(transition)
    }

    /// Append one line to the job log
    pub fn append_log(&mut self, message: impl AsRef<str>) {
        self.log.push_str(message.as_ref());
        self.log.push('\n');
    }

    /// Candidates handled so far
    pub fn processed(&self) -> u32 {
        self.imported + self.skipped + self.failed
    }

    /// Final summary line appended on completion
    pub fn summary(&self) -> String {
        format!(
            "Done! Imported {}, skipped {}, failed {}, challenges {}",
            self.imported, self.skipped, self.failed, self.challenges_created
        )
    }
}
