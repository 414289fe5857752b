/// Completion model and database operations
///
/// Completions are an append-only log of "task done" events. A completion
/// only references its task; tasks never point back at completions.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE completions (
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     completed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE INDEX completions_task_id_completed_at_idx
///     ON completions (task_id, completed_at);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::task::Interval;

/// Completion event
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Completion {
    /// Completed task
    pub task_id: Uuid,

    /// When the completion was recorded (database clock)
    pub completed_at: DateTime<Utc>,
}

impl Completion {
    /// Lists completions of a task at or after `since`, oldest first
    pub async fn list_since(
        pool: &PgPool,
        task_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let completions = sqlx::query_as::<_, Completion>(
            r#"
            SELECT task_id, completed_at
            FROM completions
            WHERE task_id = $1 AND completed_at >= $2
            ORDER BY completed_at ASC
            "#,
        )
        .bind(task_id)
        .bind(since)
        .fetch_all(pool)
        .await?;

        Ok(completions)
    }

    /// Whether the task has a completion inside the rolling window ending now
    ///
    /// The window is `(NOW() - interval.unit(), NOW()]` on the database clock.
    pub async fn exists_in_current_window(
        conn: &mut PgConnection,
        task_id: Uuid,
        interval: Interval,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM completions
                WHERE task_id = $1
                AND completed_at > NOW() - ($2::bigint * INTERVAL '1 second')
            )
            "#,
        )
        .bind(task_id)
        .bind(interval.unit().num_seconds())
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Appends a completion stamped with the database clock
    pub async fn insert(conn: &mut PgConnection, task_id: Uuid) -> Result<Self, sqlx::Error> {
        let completion = sqlx::query_as::<_, Completion>(
            r#"
            INSERT INTO completions (task_id)
            VALUES ($1)
            RETURNING task_id, completed_at
            "#,
        )
        .bind(task_id)
        .fetch_one(conn)
        .await?;

        Ok(completion)
    }

    /// Counts all completions of a task
    pub async fn count_for_task(pool: &PgPool, task_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM completions WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
