// src/db.rs

//! SQLite pool setup and the progress-store queries.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::models::exam_result::{ExamResult, SELF_EXAM_SUBJECT};

/// Opens the pool, creating the database file (and its directory) when missing.
///
/// Concurrent writers wait on the database lock for up to the busy timeout
/// instead of failing immediately.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    if !in_memory {
        if let Some(dir) = options.get_filename().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(sqlx::Error::Io)?;
            }
        }
    }

    let pool_options = if in_memory {
        // Every connection to `:memory:` is a separate database; keep exactly one alive.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
    };

    pool_options.connect_with(options).await
}

/// Creates the `resultados` table if it does not exist yet.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Appends one exam record with zero correct answers.
pub async fn record_exam(
    pool: &SqlitePool,
    level_label: &str,
    total: i64,
) -> Result<ExamResult, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(
        r#"
        INSERT INTO resultados (tema, aciertos, total, nivel)
        VALUES (?, 0, ?, ?)
        RETURNING id, tema, aciertos, total, nivel
        "#,
    )
    .bind(SELF_EXAM_SUBJECT)
    .bind(total)
    .bind(level_label)
    .fetch_one(pool)
    .await
}

/// All exam records in insertion order.
pub async fn list_results(pool: &SqlitePool) -> Result<Vec<ExamResult>, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(
        r#"
        SELECT id, tema, aciertos, total, nivel
        FROM resultados
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await
}
