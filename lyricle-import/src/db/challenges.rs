//! Challenge database operations
//!
//! A challenge is a closed line window `[start_line, end_line]` of one song.
//! (song, start_line, end_line) is unique; creating a duplicate is a silent
//! no-op.

use chrono::Utc;
use lyricle_common::db::Challenge;
use lyricle_common::{Error, Result};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

const CHALLENGE_COLUMNS: &str = "id, song_id, start_line, end_line, is_active, created_at";

/// Look up an existing challenge with exactly this window
pub async fn find_challenge<'e, E>(
    executor: E,
    song_id: i64,
    start_line: i64,
    end_line: i64,
) -> Result<Option<Challenge>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM challenges WHERE song_id = ? AND start_line = ? AND end_line = ?",
        CHALLENGE_COLUMNS
    );
    let challenge = sqlx::query_as::<_, Challenge>(&sql)
        .bind(song_id)
        .bind(start_line)
        .bind(end_line)
        .fetch_optional(executor)
        .await?;
    Ok(challenge)
}

/// Create an active challenge
///
/// Returns `None` when an identical window already exists. Fails with
/// `InvalidInput` when the range is reversed or covers lines the song does
/// not have.
///
/// The insert is the first statement issued, so inside a transaction the
/// write lock is taken before anything is read.
pub async fn create_challenge(
    conn: &mut SqliteConnection,
    song_id: i64,
    start_line: i64,
    end_line: i64,
) -> Result<Option<Challenge>> {
    if start_line < 0 || start_line > end_line {
        return Err(Error::InvalidInput(format!(
            "Invalid challenge range [{}, {}]",
            start_line, end_line
        )));
    }

    // Inserts nothing when any line of the range is missing
    let sql = format!(
        r#"
        INSERT INTO challenges (song_id, start_line, end_line, is_active, created_at)
        SELECT ?, ?, ?, 1, ?
        WHERE (
            SELECT COUNT(*) FROM lyrics
            WHERE song_id = ? AND line_number BETWEEN ? AND ?
        ) = ?
        ON CONFLICT(song_id, start_line, end_line) DO NOTHING
        RETURNING {}
        "#,
        CHALLENGE_COLUMNS
    );
    let challenge = sqlx::query_as::<_, Challenge>(&sql)
        .bind(song_id)
        .bind(start_line)
        .bind(end_line)
        .bind(Utc::now())
        .bind(song_id)
        .bind(start_line)
        .bind(end_line)
        .bind(end_line - start_line + 1)
        .fetch_optional(&mut *conn)
        .await?;

    if challenge.is_some() {
        return Ok(challenge);
    }

    if find_challenge(&mut *conn, song_id, start_line, end_line)
        .await?
        .is_some()
    {
        return Ok(None);
    }

    Err(Error::InvalidInput(format!(
        "Song {} has no lines for range [{}, {}]",
        song_id, start_line, end_line
    )))
}

/// All challenges of a song ordered by start line
pub async fn list_challenges_for_song(pool: &SqlitePool, song_id: i64) -> Result<Vec<Challenge>> {
    let sql = format!(
        "SELECT {} FROM challenges WHERE song_id = ? ORDER BY start_line, end_line",
        CHALLENGE_COLUMNS
    );
    let challenges = sqlx::query_as::<_, Challenge>(&sql)
        .bind(song_id)
        .fetch_all(pool)
        .await?;
    Ok(challenges)
}
