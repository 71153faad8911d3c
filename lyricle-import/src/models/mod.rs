//! Data models for lyricle-import
//!
//! - Bulk import job state machine and parameters
//! - Single-song import outcomes and discovery candidates

pub mod import_job;
pub mod import_outcome;

pub use import_job::{
    ImportJob, JobParameters, JobStatus, StateTransition, MAX_CHALLENGES_PER_SONG,
    MAX_REQUESTED_COUNT, SOURCE_YTMUSIC,
};
pub use import_outcome::{Candidate, ImportOutcome};
