use axum::extract::{Extension, State};
use sqlx::PgPool;

use crate::db::models::location::Location;
use crate::middleware::auth::UserScope;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::ScheduleError;

/// Locations visible in the caller's scope; used for display names and for
/// populating the scope picker.
#[utoipa::path(
    get,
    path = "/locations",
    responses(
        (status = 200, description = "Accessible locations", body = Vec<Location>),
        (status = 500, description = "Database error")
    ),
    tag = "Locations",
    security(("bearerAuth" = []))
)]
pub async fn get_locations(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
) -> Result<ApiResponse<Vec<Location>>, ScheduleError> {
    let locations = sqlx::query_as::<_, Location>(
        "SELECT id, name FROM locations \
         WHERE ($1::int4[] IS NULL OR id = ANY($1)) \
         ORDER BY name",
    )
    .bind(scope.location_filter())
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok("Locations retrieved successfully", locations))
}

// OpenAPI documentation
use utoipa::OpenApi;
#[derive(OpenApi)]
#[openapi(
    paths(get_locations),
    components(schemas(Location)),
    tags(
        (name = "Locations", description = "Read-only location master data")
    )
)]
pub struct LocationDoc;
