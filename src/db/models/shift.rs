use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// One department row for one calendar day. `assigned_personnel` is the crew
/// (lead excluded); the lead sits in its own column.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct DepartmentShift {
    pub id: i32,
    pub shift_date: NaiveDate,
    pub location_id: Option<i32>,
    pub department: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub required_count: i32,
    pub assigned_personnel: Vec<i32>,
    pub lead_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Crew/lead reference with the display name already resolved.
#[derive(Debug, Serialize, ToSchema)]
pub struct PersonRef {
    pub id: i32,
    pub name: String,
}

/// Read model for the board: a shift with its people resolved to names.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShiftView {
    pub id: i32,
    pub shift_date: NaiveDate,
    pub location_id: Option<i32>,
    pub department: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub required_count: i32,
    pub crew: Vec<PersonRef>,
    pub lead: Option<PersonRef>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewDepartment {
    pub department: String,
    pub location_id: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub required_count: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    pub person_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetLeadRequest {
    pub person_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub person_id: i32,
    pub from_shift_id: i32,
    pub to_shift_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CopyFromDateRequest {
    pub source_date: NaiveDate,
    pub target_date: NaiveDate,
    pub location_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ShiftQuery {
    /// Narrow results to a single location.
    pub location_id: Option<i32>,
}
