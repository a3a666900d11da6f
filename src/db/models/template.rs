use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct ShiftTemplate {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub location_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// A template's department skeleton. `assigned_personnel` is the snapshot
/// taken when the template was saved; application never re-applies it.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct TemplateDepartment {
    pub id: i32,
    pub template_id: i32,
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub required_count: i32,
    pub assigned_personnel: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateResponse {
    #[serde(flatten)]
    pub template: ShiftTemplate,
    pub departments: Vec<TemplateDepartment>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TemplateDepartmentInput {
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub required_count: Option<i32>,
}

/// Manual template creation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub location_id: Option<i32>,
    pub departments: Vec<TemplateDepartmentInput>,
}

/// "Save current day as template".
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveFromDateRequest {
    pub source_date: NaiveDate,
    pub name: String,
    pub description: Option<String>,
    pub location_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    /// When present, replaces the department list wholesale.
    pub departments: Option<Vec<TemplateDepartmentInput>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyTemplateRequest {
    pub target_date: NaiveDate,
    /// Destructive: wipe the target date (within the template's location
    /// scope) before materializing. Must be stated, never inferred.
    pub clear_existing: bool,
}
