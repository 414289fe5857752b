/// Task endpoints
///
/// # Endpoints
///
/// - `GET /api/tasks` - The user's tasks, each with its completion preview
/// - `POST /api/tasks` - Create a task
/// - `POST /api/tasks/:task_id/complete` - Record a completion
///
/// All endpoints require a session cookie and only ever see the
/// requesting user's tasks.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{CurrentUser, FormOrJson},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::{
    models::task::{CreateTask, Interval, Task},
    preview::{build_preview, record_completion, task_preview, BucketMap, RecordOutcome, PREVIEW_LIMIT},
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task name
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,

    /// Optional free-form description
    #[serde(default)]
    pub description: String,

    /// One of `Hourly`, `Daily`, `Weekly`, `Monthly` (case-insensitive)
    pub interval: String,
}

/// A task as shown to its owner
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Task ID
    pub id: Uuid,

    /// Task name
    pub name: String,

    /// Task description
    pub description: String,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// Recurrence interval
    pub interval: Interval,

    /// The last 30 buckets, keyed by UTC bucket label
    pub intervals_map: BucketMap,
}

impl TaskSummary {
    fn new(task: Task, intervals_map: BucketMap) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            created_at: task.created_at,
            interval: task.recurrence,
            intervals_map,
        }
    }
}

/// List the user's tasks, oldest first
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<TaskSummary>>> {
    let now = Utc::now();
    let tasks = Task::list_by_user(&state.db, user.id).await?;

    let mut summaries = Vec::with_capacity(tasks.len());
    for task in tasks {
        let preview = task_preview(&state.db, &task, now, PREVIEW_LIMIT).await?;
        summaries.push(TaskSummary::new(task, preview));
    }

    Ok(Json(summaries))
}

/// Create a task
///
/// # Errors
///
/// - `400 Bad Request`: Empty name or unknown interval
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    FormOrJson(req): FormOrJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskSummary>)> {
    let recurrence = req
        .interval
        .parse::<Interval>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: user.id,
            name: req.name,
            description: req.description,
            recurrence,
        },
    )
    .await?;

    info!(user_id = %user.id, task_id = %task.id, interval = %recurrence, "Created task");

    let preview = build_preview(recurrence, Utc::now(), PREVIEW_LIMIT, std::iter::empty());
    Ok((StatusCode::CREATED, Json(TaskSummary::new(task, preview))))
}

/// Record a completion of one of the user's tasks
///
/// At most one completion is stored per rolling interval window; a second
/// call inside the window answers `{"status": "already_completed"}`.
///
/// # Errors
///
/// - `400 Bad Request`: `task_id` is not a UUID
/// - `404 Not Found`: No such task for this user
pub async fn complete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
) -> ApiResult<Json<RecordOutcome>> {
    let task_id = Uuid::parse_str(&task_id)
        .map_err(|_| ApiError::BadRequest("Malformed task ID".to_string()))?;

    let outcome = record_completion(&state.db, task_id, user.id).await?;

    Ok(Json(outcome))
}
