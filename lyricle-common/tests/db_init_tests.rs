//! Unit tests for database initialization
//!
//! Covers first-run creation, reopening, default settings and the
//! cascade/uniqueness rules of the song tables.

use lyricle_common::db::init::{ensure_setting, get_setting, init_database, set_setting};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("lyricle.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lyricle.db");

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("lyricle.db")).await.unwrap();

    let search_delay = get_setting(&pool, "import_search_delay_ms").await.unwrap();
    assert_eq!(search_delay.as_deref(), Some("500"));

    let candidate_delay = get_setting(&pool, "import_candidate_delay_ms").await.unwrap();
    assert_eq!(candidate_delay.as_deref(), Some("1000"));

    let lock_wait = get_setting(&pool, "database_max_lock_wait_ms").await.unwrap();
    assert_eq!(lock_wait.as_deref(), Some("5000"));
}

#[tokio::test]
async fn test_existing_setting_not_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("lyricle.db")).await.unwrap();

    set_setting(&pool, "import_search_delay_ms", "0").await.unwrap();
    ensure_setting(&pool, "import_search_delay_ms", "500").await.unwrap();

    let value = get_setting(&pool, "import_search_delay_ms").await.unwrap();
    assert_eq!(value.as_deref(), Some("0"));
}

#[tokio::test]
async fn test_null_setting_reset_to_default() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("lyricle.db")).await.unwrap();

    sqlx::query("UPDATE settings SET value = NULL WHERE key = 'recent_jobs_limit'")
        .execute(&pool)
        .await
        .unwrap();

    ensure_setting(&pool, "recent_jobs_limit", "20").await.unwrap();

    let value = get_setting(&pool, "recent_jobs_limit").await.unwrap();
    assert_eq!(value.as_deref(), Some("20"));
}

#[tokio::test]
async fn test_song_delete_cascades_lyrics_and_challenges() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("lyricle.db")).await.unwrap();

    sqlx::query(
        "INSERT INTO songs (external_id, title, artist, title_key, artist_key, created_at) VALUES ('vid1', 'T', 'A', 't', 'a', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();
    let song_id: i64 = sqlx::query_scalar("SELECT id FROM songs WHERE external_id = 'vid1'")
        .fetch_one(&pool)
        .await
        .unwrap();

    for n in 0..6 {
        sqlx::query("INSERT INTO lyrics (song_id, line_number, text) VALUES (?, ?, 'line')")
            .bind(song_id)
            .bind(n)
            .execute(&pool)
            .await
            .unwrap();
    }
    sqlx::query(
        "INSERT INTO challenges (song_id, start_line, end_line, created_at) VALUES (?, 1, 4, '2024-01-01T00:00:00Z')",
    )
    .bind(song_id)
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(song_id)
        .execute(&pool)
        .await
        .unwrap();

    let lyrics: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lyrics")
        .fetch_one(&pool)
        .await
        .unwrap();
    let challenges: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM challenges")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(lyrics, 0);
    assert_eq!(challenges, 0);
}

#[tokio::test]
async fn test_duplicate_external_id_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("lyricle.db")).await.unwrap();

    let insert = "INSERT INTO songs (external_id, title, artist, title_key, artist_key, created_at) VALUES ('dup', 'T', 'A', 't', 'a', '2024-01-01T00:00:00Z')";
    sqlx::query(insert).execute(&pool).await.unwrap();

    let err = sqlx::query(insert).execute(&pool).await.unwrap_err();
    let err = lyricle_common::Error::from(err);
    assert!(err.is_unique_violation(), "expected unique violation, got {:?}", err);
}
