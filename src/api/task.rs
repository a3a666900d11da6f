use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::task::{create_task, delete_task, get_tasks_for_date, toggle_task};

/// Daily task board routes. Item operations live under `/tasks/items` so the
/// date segment and the task-id segment never collide.
pub fn task_routes() -> Router<PgPool> {
    Router::new()
        .route("/tasks/{date}", get(get_tasks_for_date))
        .route("/tasks/{date}", post(create_task))
        .route("/tasks/items/{task_id}/toggle", patch(toggle_task))
        .route("/tasks/items/{task_id}", delete(delete_task))
}
