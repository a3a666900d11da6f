use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Directory record consumed read-only; hire/terminate/edit live elsewhere.
/// Only `status = "active"` personnel are schedulable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Personnel {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub location_id: Option<i32>,
    pub status: String,
}

impl Personnel {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Unassigned-pool entry, pre-joined with the location name the UI sorts by.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct UnassignedPerson {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub location_id: Option<i32>,
    pub location_name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PersonnelQuery {
    pub location_id: Option<i32>,
}
