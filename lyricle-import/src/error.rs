//! Error types for lyricle-import
//!
//! Per-candidate failures (`ImportError::is_candidate_failure`) are absorbed by
//! the bulk import orchestrator as a counter increment plus a job log line.
//! Anything else escapes the job and marks it failed.

use thiserror::Error;

/// Catalog provider errors (search, metadata, lyrics calls)
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Track not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Single-song import failure
#[derive(Debug, Error)]
pub enum ImportError {
    /// Provider has no lyrics for the track
    #[error("No lyrics available")]
    NoLyricsAvailable,

    /// Lyrics exist but have too few non-blank lines for a challenge
    #[error("Lyrics too short ({lines} lines)")]
    TooShort { lines: usize },

    /// Search, metadata or lyrics call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Store failure; not attributable to the candidate
    #[error(transparent)]
    Store(#[from] lyricle_common::Error),
}

impl ImportError {
    /// True for failures that only affect the current candidate
    pub fn is_candidate_failure(&self) -> bool {
        !matches!(self, ImportError::Store(_))
    }
}

impl From<sqlx::Error> for ImportError {
    fn from(err: sqlx::Error) -> Self {
        ImportError::Store(lyricle_common::Error::Database(err))
    }
}

impl From<ImportError> for lyricle_common::Error {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Store(e) => e,
            other => lyricle_common::Error::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_failures() {
        assert!(ImportError::NoLyricsAvailable.is_candidate_failure());
        assert!(ImportError::TooShort { lines: 3 }.is_candidate_failure());
        assert!(ImportError::Provider(ProviderError::RateLimited).is_candidate_failure());
        assert!(!ImportError::Store(lyricle_common::Error::Internal("x".into())).is_candidate_failure());
    }

    #[test]
    fn test_store_error_unwraps_into_common_error() {
        let err: lyricle_common::Error =
            ImportError::Store(lyricle_common::Error::NotFound("song".into())).into();
        assert!(matches!(err, lyricle_common::Error::NotFound(_)));

        let err: lyricle_common::Error = ImportError::NoLyricsAvailable.into();
        assert!(matches!(err, lyricle_common::Error::Internal(_)));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(ImportError::TooShort { lines: 4 }.to_string(), "Lyrics too short (4 lines)");
        assert_eq!(
            ImportError::Provider(ProviderError::Api(500, "boom".into())).to_string(),
            "Provider error: API error 500: boom"
        );
    }
}
