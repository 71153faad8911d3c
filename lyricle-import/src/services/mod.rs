//! Service modules for lyric import
//!
//! - Catalog access: provider trait and the YouTube Music client
//! - Per-song work: language detection, import, challenge selection
//! - Bulk work: discovery, orchestration and job lifecycle

pub mod bulk_import_orchestrator;
pub mod catalog_provider;
pub mod discovery_engine;
pub mod job_manager;
pub mod language_detector;
pub mod snippet_selector;
pub mod song_importer;
pub mod ytmusic_client;

pub use bulk_import_orchestrator::BulkImportOrchestrator;
pub use catalog_provider::{
    CatalogProvider, LyricsReference, RawLyrics, SearchHit, TimedLine, TrackMetadata,
};
pub use discovery_engine::{DiscoveryEngine, DiscoveryRequest};
pub use job_manager::JobManager;
pub use language_detector::detect_language;
pub use snippet_selector::select_challenges;
pub use song_importer::SongImporter;
pub use ytmusic_client::YtMusicClient;
