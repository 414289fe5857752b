/// Interval-bucketed completion aggregation
///
/// The preview answers "was this task completed in each of its last N
/// intervals?" as a map from bucket key to bool, for calendar-style
/// rendering.
///
/// # Buckets
///
/// For an interval with length `unit` and a preview of `limit` buckets:
///
/// ```text
/// window_start = now - unit * (limit - 1)
/// bucket j     = format(window_start + j * unit)      for j in 0..limit
/// ```
///
/// Keys are rendered in UTC at the interval's granularity (hour for Hourly,
/// day for everything else), so two completions in the same calendar hour
/// (Hourly) or the same calendar day (Daily/Weekly/Monthly) land in the same
/// bucket. A completion whose key is not one of the `limit` bucket keys is
/// dropped; for Weekly and Monthly tasks that includes completions on days
/// that fall between bucket boundaries.
///
/// Task creation time plays no part: buckets before the task existed are
/// simply `false`.
///
/// # Recording
///
/// [`record_completion`] stores at most one completion per rolling window
/// `(now - unit, now]`. Windows are relative to the moment of the call, not
/// aligned to calendar boundaries.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use tally_shared::models::task::Interval;
/// use tally_shared::preview::{build_preview, PREVIEW_LIMIT};
///
/// let now = Utc::now();
/// let done = [now - Duration::days(2), now - Duration::days(1)];
///
/// let buckets = build_preview(Interval::Daily, now, PREVIEW_LIMIT, done);
/// assert_eq!(buckets.len(), 30);
/// assert_eq!(buckets.values().filter(|done| **done).count(), 2);
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::models::{
    completion::Completion,
    task::{Interval, Task},
};

/// Number of buckets in a task preview
pub const PREVIEW_LIMIT: usize = 30;

/// Bucket key to "completed in this bucket"
///
/// Keys are UTC timestamps of a fixed layout, so key order is chronological.
pub type BucketMap = BTreeMap<String, bool>;

/// Oldest bucket boundary of a preview ending at `now`
pub fn window_start(interval: Interval, now: DateTime<Utc>, limit: usize) -> DateTime<Utc> {
    let steps = i32::try_from(limit.saturating_sub(1)).unwrap_or(i32::MAX);
    now - interval.unit() * steps
}

/// Formats a timestamp as a bucket key for the given interval
pub fn bucket_key(interval: Interval, at: DateTime<Utc>) -> String {
    at.format(interval.granularity().layout()).to_string()
}

/// Builds the bucket map from raw completion timestamps
///
/// Always returns exactly `limit` entries.
pub fn build_preview<I>(
    interval: Interval,
    now: DateTime<Utc>,
    limit: usize,
    completions: I,
) -> BucketMap
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    if limit == 0 {
        return BucketMap::new();
    }

    let start = window_start(interval, now, limit);
    let unit = interval.unit();

    let mut buckets: BucketMap = (0..limit)
        .map(|j| {
            let offset = unit * i32::try_from(j).unwrap_or(i32::MAX);
            (bucket_key(interval, start + offset), false)
        })
        .collect();

    for completed_at in completions {
        if completed_at < start {
            continue;
        }

        if let Some(slot) = buckets.get_mut(&bucket_key(interval, completed_at)) {
            *slot = true;
        }
    }

    buckets
}

/// Loads a task's completions and builds its preview
#[instrument(skip(pool, task), fields(task_id = %task.id, interval = %task.recurrence))]
pub async fn task_preview(
    pool: &PgPool,
    task: &Task,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<BucketMap, sqlx::Error> {
    let since = window_start(task.recurrence, now, limit);
    let completions = Completion::list_since(pool, task.id, since).await?;

    debug!(completions = completions.len(), "Loaded completions for preview");

    Ok(build_preview(
        task.recurrence,
        now,
        limit,
        completions.into_iter().map(|c| c.completed_at),
    ))
}

/// Outcome of [`record_completion`]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// A new completion row was stored
    Recorded {
        /// The stored completion
        completion: Completion,
    },

    /// The task already has a completion in the current window; nothing stored
    AlreadyCompleted,
}

impl RecordOutcome {
    /// Whether a row was written
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded { .. })
    }
}

/// Error type for completion recording
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// No task with this ID belongs to the user
    #[error("Task not found")]
    TaskNotFound,

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Records a completion unless one already exists in the current window
///
/// The check and the insert run in one transaction holding a row lock on
/// the task, so concurrent calls for the same task are serialised and at
/// most one of them inserts.
#[instrument(skip(pool))]
pub async fn record_completion(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<RecordOutcome, CompletionError> {
    let mut tx = pool.begin().await?;

    let interval: Option<(Interval,)> = sqlx::query_as(
        r#"
        SELECT recurrence
        FROM tasks
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((interval,)) = interval else {
        return Err(CompletionError::TaskNotFound);
    };

    if Completion::exists_in_current_window(&mut tx, task_id, interval).await? {
        debug!(%interval, "Task already completed in current window");
        tx.commit().await?;
        return Ok(RecordOutcome::AlreadyCompleted);
    }

    let completion = Completion::insert(&mut tx, task_id).await?;
    tx.commit().await?;

    debug!(%interval, completed_at = %completion.completed_at, "Recorded completion");
    Ok(RecordOutcome::Recorded { completion })
}
