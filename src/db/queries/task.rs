use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::db::models::task::{DailyTask, NewTask, TaskQuery};
use crate::middleware::auth::UserScope;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::ScheduleError;

const TASK_COLUMNS: &str = "id, task_date, department, location_id, text, completed, created_at";

fn require_edit(scope: &UserScope) -> Result<(), ScheduleError> {
    if scope.can_edit_shifts() {
        Ok(())
    } else {
        Err(ScheduleError::ScopeViolation(
            "your role cannot edit daily tasks".to_string(),
        ))
    }
}

fn require_location(scope: &UserScope, location_id: Option<i32>) -> Result<(), ScheduleError> {
    if scope.can_access(location_id) {
        Ok(())
    } else {
        Err(ScheduleError::ScopeViolation(format!(
            "location {} is outside your accessible scope",
            location_id.map_or_else(|| "(global)".to_string(), |id| id.to_string()),
        )))
    }
}

async fn fetch_task(pool: &PgPool, task_id: i32) -> Result<DailyTask, ScheduleError> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM daily_tasks WHERE id = $1");
    sqlx::query_as::<_, DailyTask>(&sql)
        .bind(task_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ScheduleError::not_found("task", task_id))
}

/// List the day's tasks, optionally narrowed to one department.
#[utoipa::path(
    get,
    path = "/tasks/{date}",
    params(
        ("date" = String, Path, description = "Calendar date (YYYY-MM-DD)"),
        TaskQuery
    ),
    responses(
        (status = 200, description = "Tasks for the date", body = Vec<DailyTask>),
        (status = 403, description = "Location outside caller's scope"),
        (status = 500, description = "Database error")
    ),
    tag = "Tasks",
    security(("bearerAuth" = []))
)]
pub async fn get_tasks_for_date(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(date): Path<NaiveDate>,
    Query(params): Query<TaskQuery>,
) -> Result<ApiResponse<Vec<DailyTask>>, ScheduleError> {
    require_location(&scope, params.location_id)?;

    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM daily_tasks \
         WHERE task_date = $1 \
           AND ($2::text IS NULL OR department = $2) \
           AND ($3::int4 IS NULL OR location_id = $3) \
           AND ($4::int4[] IS NULL OR location_id IS NULL OR location_id = ANY($4)) \
         ORDER BY department, id"
    );
    let tasks = sqlx::query_as::<_, DailyTask>(&sql)
        .bind(date)
        .bind(&params.department)
        .bind(params.location_id)
        .bind(scope.location_filter())
        .fetch_all(&pool)
        .await?;

    Ok(ApiResponse::ok("Tasks retrieved successfully", tasks))
}

/// Add a task for (date, department). No shift row is required: tasks may
/// be authored before staffing is finalized.
#[utoipa::path(
    post,
    path = "/tasks/{date}",
    params(("date" = String, Path, description = "Calendar date (YYYY-MM-DD)")),
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created", body = DailyTask),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 500, description = "Database error")
    ),
    tag = "Tasks",
    security(("bearerAuth" = []))
)]
pub async fn create_task(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(date): Path<NaiveDate>,
    Json(payload): Json<NewTask>,
) -> Result<ApiResponse<DailyTask>, ScheduleError> {
    require_edit(&scope)?;
    require_location(&scope, payload.location_id)?;

    let sql = format!(
        "INSERT INTO daily_tasks (task_date, department, location_id, text) \
         VALUES ($1, $2, $3, $4) RETURNING {TASK_COLUMNS}"
    );
    let task = sqlx::query_as::<_, DailyTask>(&sql)
        .bind(date)
        .bind(&payload.department)
        .bind(payload.location_id)
        .bind(&payload.text)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Task created successfully",
        task,
    ))
}

/// Flip a task's completed flag.
#[utoipa::path(
    patch,
    path = "/tasks/items/{task_id}/toggle",
    params(("task_id" = i32, Path, description = "Task to toggle")),
    responses(
        (status = 200, description = "Task toggled", body = DailyTask),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Database error")
    ),
    tag = "Tasks",
    security(("bearerAuth" = []))
)]
pub async fn toggle_task(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(task_id): Path<i32>,
) -> Result<ApiResponse<DailyTask>, ScheduleError> {
    require_edit(&scope)?;
    let task = fetch_task(&pool, task_id).await?;
    require_location(&scope, task.location_id)?;

    let sql = format!(
        "UPDATE daily_tasks SET completed = NOT completed WHERE id = $1 RETURNING {TASK_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, DailyTask>(&sql)
        .bind(task_id)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::ok("Task toggled successfully", updated))
}

/// Remove a task.
#[utoipa::path(
    delete,
    path = "/tasks/items/{task_id}",
    params(("task_id" = i32, Path, description = "Task to delete")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Database error")
    ),
    tag = "Tasks",
    security(("bearerAuth" = []))
)]
pub async fn delete_task(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(task_id): Path<i32>,
) -> Result<ApiResponse<()>, ScheduleError> {
    require_edit(&scope)?;
    let task = fetch_task(&pool, task_id).await?;
    require_location(&scope, task.location_id)?;

    sqlx::query("DELETE FROM daily_tasks WHERE id = $1")
        .bind(task_id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::ok("Task deleted successfully", ()))
}

// OpenAPI documentation
use utoipa::OpenApi;
#[derive(OpenApi)]
#[openapi(
    paths(get_tasks_for_date, create_task, toggle_task, delete_task),
    components(schemas(DailyTask, NewTask)),
    tags(
        (name = "Tasks", description = "Per-day, per-department operational checklists")
    )
)]
pub struct TaskDoc;
