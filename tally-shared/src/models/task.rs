/// Task model and database operations
///
/// A task is a recurring habit owned by one user. Its recurrence interval is
/// fixed at creation and determines both the rolling completion window and
/// the bucket width of its calendar preview.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_interval AS ENUM ('Hourly', 'Daily', 'Weekly', 'Monthly');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     recurrence task_interval NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tally_shared::models::task::{CreateTask, Interval, Task};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     user_id,
///     name: "Stretch".to_string(),
///     description: "Ten minutes".to_string(),
///     recurrence: Interval::Daily,
/// })
/// .await?;
///
/// let mine = Task::list_by_user(&pool, user_id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Resolution of a preview bucket key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Keys distinguish calendar hours
    Hour,

    /// Keys distinguish calendar days
    Day,
}

impl Granularity {
    /// `chrono` format layout for bucket keys, always rendered in UTC
    pub fn layout(&self) -> &'static str {
        match self {
            Granularity::Hour => "%Y-%m-%dT%HZ",
            Granularity::Day => "%Y-%m-%dZ",
        }
    }
}

/// Task recurrence interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_interval")]
pub enum Interval {
    /// Once per hour
    Hourly,

    /// Once per day
    Daily,

    /// Once per week
    Weekly,

    /// Once per 30 days
    Monthly,
}

impl Interval {
    /// All intervals, shortest first
    pub const ALL: [Interval; 4] = [
        Interval::Hourly,
        Interval::Daily,
        Interval::Weekly,
        Interval::Monthly,
    ];

    /// Fixed length of one interval
    ///
    /// Months are a flat 30 days, not calendar months.
    pub fn unit(&self) -> Duration {
        match self {
            Interval::Hourly => Duration::hours(1),
            Interval::Daily => Duration::days(1),
            Interval::Weekly => Duration::weeks(1),
            Interval::Monthly => Duration::days(30),
        }
    }

    /// Bucket key resolution used by the preview
    pub fn granularity(&self) -> Granularity {
        match self {
            Interval::Hourly => Granularity::Hour,
            Interval::Daily | Interval::Weekly | Interval::Monthly => Granularity::Day,
        }
    }

    /// Name as stored in the database and returned over the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hourly => "Hourly",
            Interval::Daily => "Daily",
            Interval::Weekly => "Weekly",
            Interval::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown interval name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown interval '{0}', expected one of hourly, daily, weekly, monthly")]
pub struct ParseIntervalError(pub String);

impl FromStr for Interval {
    type Err = ParseIntervalError;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Interval::Hourly),
            "daily" => Ok(Interval::Daily),
            "weekly" => Ok(Interval::Weekly),
            "monthly" => Ok(Interval::Monthly),
            _ => Err(ParseIntervalError(s.to_string())),
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Free-form description (may be empty)
    pub description: String,

    /// Recurrence interval
    pub recurrence: Interval,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user
    pub user_id: Uuid,

    /// Task name
    pub name: String,

    /// Description
    pub description: String,

    /// Recurrence interval
    pub recurrence: Interval,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, name, description, recurrence)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, description, recurrence, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.recurrence)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, scoped to its owner
    ///
    /// A task that exists but belongs to someone else is reported as absent.
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, name, description, recurrence, created_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a user's tasks, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, name, description, recurrence, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}
