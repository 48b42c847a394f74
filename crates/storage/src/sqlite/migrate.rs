use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs versioned schema migrations for reports and their per-question items.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: reports + items.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS reports (
                    id INTEGER PRIMARY KEY,
                    session_id TEXT NOT NULL UNIQUE,
                    learner_name TEXT NOT NULL,
                    learner_email TEXT,
                    topic TEXT NOT NULL,
                    difficulty TEXT NOT NULL,
                    started_at TEXT NOT NULL,
                    completed_at TEXT NOT NULL,
                    score INTEGER NOT NULL CHECK (score >= 0),
                    total INTEGER NOT NULL CHECK (total >= 0),
                    CHECK (score <= total)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS report_items (
                    report_id INTEGER NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    question_index INTEGER NOT NULL CHECK (question_index >= 0),
                    question TEXT NOT NULL,
                    option_labels TEXT NOT NULL CHECK (length(option_labels) = 4),
                    option_1 TEXT NOT NULL,
                    option_2 TEXT NOT NULL,
                    option_3 TEXT NOT NULL,
                    option_4 TEXT NOT NULL,
                    chosen TEXT NOT NULL,
                    chosen_text TEXT NOT NULL,
                    correct TEXT NOT NULL,
                    correct_text TEXT NOT NULL,
                    explanation TEXT NOT NULL,
                    is_correct INTEGER NOT NULL CHECK (is_correct IN (0, 1)),
                    PRIMARY KEY (report_id, position),
                    FOREIGN KEY (report_id) REFERENCES reports(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_reports_completed
                    ON reports (completed_at, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
