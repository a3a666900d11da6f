use axum::extract::{Extension, Query, State};
use sqlx::PgPool;

use crate::db::models::personnel::{Personnel, PersonnelQuery};
use crate::middleware::auth::UserScope;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::ScheduleError;

/// Active personnel in the caller's scope. The directory itself is owned by
/// the surrounding system; this service only reads it.
#[utoipa::path(
    get,
    path = "/personnel",
    params(PersonnelQuery),
    responses(
        (status = 200, description = "Active personnel", body = Vec<Personnel>),
        (status = 403, description = "Location outside caller's scope"),
        (status = 500, description = "Database error")
    ),
    tag = "Personnel",
    security(("bearerAuth" = []))
)]
pub async fn get_active_personnel(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Query(params): Query<PersonnelQuery>,
) -> Result<ApiResponse<Vec<Personnel>>, ScheduleError> {
    if !scope.can_access(params.location_id) {
        return Err(ScheduleError::ScopeViolation(
            "location is outside your accessible scope".to_string(),
        ));
    }

    let people = sqlx::query_as::<_, Personnel>(
        "SELECT id, first_name, last_name, department, location_id, status \
         FROM personnel \
         WHERE status = 'active' \
           AND ($1::int4 IS NULL OR location_id = $1) \
           AND ($2::int4[] IS NULL OR location_id IS NULL OR location_id = ANY($2)) \
         ORDER BY last_name, first_name",
    )
    .bind(params.location_id)
    .bind(scope.location_filter())
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok("Personnel retrieved successfully", people))
}

// OpenAPI documentation
use utoipa::OpenApi;
#[derive(OpenApi)]
#[openapi(
    paths(get_active_personnel),
    components(schemas(Personnel)),
    tags(
        (name = "Personnel", description = "Read-only personnel directory")
    )
)]
pub struct PersonnelDoc;
