//! Challenge snippet selection
//!
//! Scores every contiguous window of a song's lyrics (skipping a margin at
//! both ends) and turns the best non-overlapping windows into challenges.
//! Windows made of one repeated line are never offered.

use lyricle_common::db::{LyricLine, MIN_LYRIC_LINES};
use lyricle_common::Result;
use sqlx::SqlitePool;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::db::challenges::{create_challenge, find_challenge};
use crate::db::songs::list_lines;

/// Widest window offered as a challenge
const MAX_WINDOW_LINES: usize = 4;

/// Line length at which the length factor reaches 1.0
const REFERENCE_LINE_CHARS: f64 = 30.0;

/// A scored candidate window `[start_line, end_line]`
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredWindow {
    pub start_line: i64,
    pub end_line: i64,
    pub score: f64,
}

impl ScoredWindow {
    fn overlaps(&self, start: i64, end: i64) -> bool {
        !(self.end_line < start || self.start_line > end)
    }
}

/// Score all candidate windows, best first
///
/// Returns nothing for songs with fewer than six lines. Equal scores keep
/// their position order.
pub fn score_windows(lines: &[LyricLine]) -> Vec<ScoredWindow> {
    let total = lines.len();
    if total < MIN_LYRIC_LINES {
        return Vec::new();
    }

    let margin = (total / 7).max(1);
    let candidates = if margin < total / 2 {
        &lines[margin..total - margin]
    } else {
        lines
    };
    let width = MAX_WINDOW_LINES.min(candidates.len() - 1);

    let mut scored: Vec<ScoredWindow> = candidates
        .windows(width)
        .filter_map(|window| score_window(window, width))
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

fn score_window(window: &[LyricLine], width: usize) -> Option<ScoredWindow> {
    let distinct_lines = window
        .iter()
        .map(|l| l.text.trim().to_lowercase())
        .collect::<HashSet<_>>()
        .len();
    if distinct_lines < 2 {
        return None;
    }

    let words: Vec<&str> = window.iter().flat_map(|l| l.text.split_whitespace()).collect();
    let unique_words = words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<HashSet<_>>()
        .len();
    let unique_ratio = unique_words as f64 / words.len().max(1) as f64;

    let total_chars: usize = window.iter().map(|l| l.text.chars().count()).sum();
    let avg_len = total_chars as f64 / width as f64;

    let score = words.len() as f64
        * unique_ratio
        * (avg_len / REFERENCE_LINE_CHARS)
        * (distinct_lines as f64 / width as f64);

    Some(ScoredWindow {
        start_line: window[0].line_number,
        end_line: window[window.len() - 1].line_number,
        score,
    })
}

/// Create up to `count` challenges for a song; returns how many were created
///
/// Windows overlapping one accepted in this run are skipped, as are windows
/// identical to an existing challenge. All inserts commit together.
pub async fn select_challenges(pool: &SqlitePool, song_id: i64, count: u32) -> Result<usize> {
    if count == 0 {
        return Ok(0);
    }

    let lines = list_lines(pool, song_id).await?;
    let scored = score_windows(&lines);
    if scored.is_empty() {
        tracing::debug!(song_id, lines = lines.len(), "Too few lines for a challenge");
        return Ok(0);
    }

    // Existing windows are looked up outside the transaction so that its first
    // statement is a write
    let mut tx = pool.begin().await?;
    let mut accepted: Vec<ScoredWindow> = Vec::new();

    for window in scored {
        if accepted.len() >= count as usize {
            break;
        }
        if accepted
            .iter()
            .any(|a| a.overlaps(window.start_line, window.end_line))
        {
            continue;
        }
        if find_challenge(pool, song_id, window.start_line, window.end_line)
            .await?
            .is_some()
        {
            continue;
        }

        if create_challenge(&mut tx, song_id, window.start_line, window.end_line)
            .await?
            .is_some()
        {
            tracing::debug!(
                song_id,
                start_line = window.start_line,
                end_line = window.end_line,
                score = window.score,
                "Challenge window accepted"
            );
            accepted.push(window);
        }
    }

    if !accepted.is_empty() {
        tx.commit().await?;
    }

    Ok(accepted.len())
}
