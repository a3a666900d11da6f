use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// A short-lived operational checklist item for (date, department). Tasks
/// have no foreign key to department_shifts and survive any reassignment.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct DailyTask {
    pub id: i32,
    pub task_date: NaiveDate,
    pub department: String,
    pub location_id: Option<i32>,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewTask {
    pub department: String,
    pub text: String,
    pub location_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TaskQuery {
    pub department: Option<String>,
    pub location_id: Option<i32>,
}
