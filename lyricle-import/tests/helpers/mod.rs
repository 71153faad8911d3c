//! Test Helper Utilities
//!
//! Shared utilities for testing lyricle-import

#![allow(dead_code)]

pub mod db_utils;
pub mod mock_provider;

pub use db_utils::{create_test_db, get_table_columns, wait_for_terminal};
pub use mock_provider::{english_lyrics, hit, MockProvider};
