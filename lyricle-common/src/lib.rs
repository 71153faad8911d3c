//! # Lyricle Common Library
//!
//! Shared code for the Lyricle services including:
//! - Database initialization and row models (songs, lyrics, challenges)
//! - Bootstrap configuration loading and root folder resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
