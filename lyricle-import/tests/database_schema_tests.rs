//! Schema checks for the tables lyricle-import reads and writes

mod helpers;

use helpers::{create_test_db, get_table_columns};

async fn column_names(pool: &sqlx::SqlitePool, table: &str) -> Vec<String> {
    get_table_columns(pool, table)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[tokio::test]
async fn test_bulk_import_jobs_columns() {
    let (_dir, pool) = create_test_db().await.unwrap();
    let columns = column_names(&pool, "bulk_import_jobs").await;

    for expected in [
        "id",
        "source",
        "language",
        "requested_count",
        "challenges_per_song",
        "year_from",
        "year_to",
        "search_query",
        "status",
        "total_found",
        "imported",
        "skipped",
        "failed",
        "challenges_created",
        "log",
        "created_at",
        "updated_at",
    ] {
        assert!(columns.iter().any(|c| c == expected), "missing column {}", expected);
    }
}

#[tokio::test]
async fn test_song_tables_columns() {
    let (_dir, pool) = create_test_db().await.unwrap();

    let songs = column_names(&pool, "songs").await;
    for expected in ["external_id", "title", "artist", "album", "thumbnail_url", "language"] {
        assert!(songs.iter().any(|c| c == expected), "songs missing {}", expected);
    }

    let lyrics = column_names(&pool, "lyrics").await;
    assert_eq!(lyrics, vec!["id", "song_id", "line_number", "text"]);

    let challenges = get_table_columns(&pool, "challenges").await.unwrap();
    let is_active = challenges.iter().find(|c| c.name == "is_active").unwrap();
    assert_eq!(is_active.notnull, 1);
    assert_eq!(is_active.dflt_value.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_job_status_is_constrained() {
    let (_dir, pool) = create_test_db().await.unwrap();

    let result = sqlx::query(
        "INSERT INTO bulk_import_jobs (id, source, requested_count, status, created_at, updated_at) VALUES ('x', 'ytmusic', 1, 'paused', '', '')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}
