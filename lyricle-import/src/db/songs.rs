//! Song and lyric line database operations

use chrono::Utc;
use lyricle_common::db::{normalize_key, LyricLine, NewSong, Song, MIN_LYRIC_LINES};
use lyricle_common::{Error, Result};
use sqlx::SqlitePool;

const SONG_COLUMNS: &str =
    "id, external_id, title, artist, album, thumbnail_url, language, created_at";

/// Load song by catalog external id
pub async fn find_song_by_external_id(pool: &SqlitePool, external_id: &str) -> Result<Option<Song>> {
    let sql = format!("SELECT {} FROM songs WHERE external_id = ?", SONG_COLUMNS);
    let song = sqlx::query_as::<_, Song>(&sql)
        .bind(external_id)
        .fetch_optional(pool)
        .await?;
    Ok(song)
}

/// Load song whose normalized (title, artist) pair matches
pub async fn find_song_by_title_artist(
    pool: &SqlitePool,
    title: &str,
    artist: &str,
) -> Result<Option<Song>> {
    let sql = format!(
        "SELECT {} FROM songs WHERE title_key = ? AND artist_key = ? ORDER BY id LIMIT 1",
        SONG_COLUMNS
    );
    let song = sqlx::query_as::<_, Song>(&sql)
        .bind(normalize_key(title))
        .bind(normalize_key(artist))
        .fetch_optional(pool)
        .await?;
    Ok(song)
}

/// Persist a song and its lyric lines atomically
///
/// Lines are numbered from zero in the given order. Either the song and all
/// of its lines are written or nothing is: the transaction rolls back when
/// dropped on any error path.
pub async fn create_song_with_lines(
    pool: &SqlitePool,
    song: &NewSong,
    lines: &[String],
) -> Result<Song> {
    if lines.iter().any(|l| l.trim().is_empty()) {
        return Err(Error::InvalidInput("Lyric lines must not be blank".to_string()));
    }
    if lines.len() < MIN_LYRIC_LINES {
        return Err(Error::InvalidInput(format!(
            "A song needs at least {} lyric lines, got {}",
            MIN_LYRIC_LINES,
            lines.len()
        )));
    }

    let created_at = Utc::now();
    let mut tx = pool.begin().await?;

    let song_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO songs (
            external_id, title, artist, album, thumbnail_url, language,
            title_key, artist_key, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&song.external_id)
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.album)
    .bind(&song.thumbnail_url)
    .bind(&song.language)
    .bind(normalize_key(&song.title))
    .bind(normalize_key(&song.artist))
    .bind(created_at)
    .fetch_one(&mut *tx)
    .await?;

    for (line_number, text) in lines.iter().enumerate() {
        sqlx::query("INSERT INTO lyrics (song_id, line_number, text) VALUES (?, ?, ?)")
            .bind(song_id)
            .bind(line_number as i64)
            .bind(text)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        song_id,
        external_id = %song.external_id,
        lines = lines.len(),
        "Song persisted with lyrics"
    );

    Ok(Song {
        id: song_id,
        external_id: song.external_id.clone(),
        title: song.title.clone(),
        artist: song.artist.clone(),
        album: song.album.clone(),
        thumbnail_url: song.thumbnail_url.clone(),
        language: song.language.clone(),
        created_at,
    })
}

/// Ordered lyric lines of a song
pub async fn list_lines(pool: &SqlitePool, song_id: i64) -> Result<Vec<LyricLine>> {
    let lines = sqlx::query_as::<_, LyricLine>(
        "SELECT id, song_id, line_number, text FROM lyrics WHERE song_id = ? ORDER BY line_number",
    )
    .bind(song_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

/// Update a song's language code (lowercased)
pub async fn set_song_language(pool: &SqlitePool, song_id: i64, language: &str) -> Result<()> {
    let result = sqlx::query("UPDATE songs SET language = ? WHERE id = ?")
        .bind(language.trim().to_lowercase())
        .bind(song_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Song {}", song_id)));
    }
    Ok(())
}

/// Delete a song; lyrics and challenges cascade
pub async fn delete_song(pool: &SqlitePool, song_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(song_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Number of stored songs
pub async fn count_songs(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
