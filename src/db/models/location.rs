use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Location master data, read-only here; used for display names and to
/// validate scope.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Location {
    pub id: i32,
    pub name: String,
}
