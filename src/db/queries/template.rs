use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use crate::db::models::shift::DepartmentShift;
use crate::db::models::template::{
    ApplyTemplateRequest, NewTemplate, SaveFromDateRequest, ShiftTemplate, TemplateDepartment,
    TemplateDepartmentInput, TemplateResponse, UpdateTemplate,
};
use crate::middleware::auth::UserScope;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::ScheduleError;

const TEMPLATE_COLUMNS: &str = "id, name, description, location_id, created_at";
const DEPT_COLUMNS: &str =
    "id, template_id, name, start_time, end_time, required_count, assigned_personnel";

fn require_edit(scope: &UserScope) -> Result<(), ScheduleError> {
    if scope.can_edit_shifts() {
        Ok(())
    } else {
        Err(ScheduleError::ScopeViolation(
            "your role cannot manage templates".to_string(),
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

/// Duplicate names inside one template would materialize into colliding
/// shift rows, so they are rejected up front.
fn check_department_inputs(departments: &[TemplateDepartmentInput]) -> Result<(), ScheduleError> {
    if departments.is_empty() {
        return Err(ScheduleError::InvalidState(
            "a template must define at least one department".to_string(),
        ));
    }
    let mut seen = std::collections::HashSet::new();
    for d in departments {
        if !seen.insert(d.name.as_str()) {
            return Err(ScheduleError::InvalidState(format!(
                "duplicate department '{}' in template",
                d.name,
            )));
        }
    }
    Ok(())
}

/// Saving an empty day would mint a useless template, so it is refused
/// before any row is written.
fn check_source_shifts(
    shifts: &[DepartmentShift],
    source_date: NaiveDate,
) -> Result<(), ScheduleError> {
    if shifts.is_empty() {
        return Err(ScheduleError::PreconditionFailed(format!(
            "nothing to save: no shifts exist on {source_date}",
        )));
    }
    Ok(())
}

async fn fetch_template(pool: &PgPool, template_id: i32) -> Result<ShiftTemplate, ScheduleError> {
    let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM shift_templates WHERE id = $1");
    sqlx::query_as::<_, ShiftTemplate>(&sql)
        .bind(template_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ScheduleError::not_found("template", template_id))
}

async fn fetch_departments(
    pool: &PgPool,
    template_id: i32,
) -> Result<Vec<TemplateDepartment>, ScheduleError> {
    let sql =
        format!("SELECT {DEPT_COLUMNS} FROM template_departments WHERE template_id = $1 ORDER BY id");
    Ok(sqlx::query_as::<_, TemplateDepartment>(&sql)
        .bind(template_id)
        .fetch_all(pool)
        .await?)
}

async fn insert_department_inputs(
    tx: &mut Transaction<'_, Postgres>,
    template_id: i32,
    departments: &[TemplateDepartmentInput],
) -> Result<(), sqlx::Error> {
    for d in departments {
        sqlx::query(
            "INSERT INTO template_departments \
                 (template_id, name, start_time, end_time, required_count) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(template_id)
        .bind(&d.name)
        .bind(&d.start_time)
        .bind(&d.end_time)
        .bind(d.required_count.unwrap_or(0))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// List templates visible in the caller's scope.
#[utoipa::path(
    get,
    path = "/templates",
    responses(
        (status = 200, description = "Templates for the caller's scope", body = Vec<ShiftTemplate>),
        (status = 500, description = "Database error")
    ),
    tag = "Templates",
    security(("bearerAuth" = []))
)]
pub async fn get_templates(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
) -> Result<ApiResponse<Vec<ShiftTemplate>>, ScheduleError> {
    let sql = format!(
        "SELECT {TEMPLATE_COLUMNS} FROM shift_templates \
         WHERE ($1::int4[] IS NULL OR location_id IS NULL OR location_id = ANY($1)) \
         ORDER BY name"
    );
    let templates = sqlx::query_as::<_, ShiftTemplate>(&sql)
        .bind(scope.location_filter())
        .fetch_all(&pool)
        .await?;
    Ok(ApiResponse::ok("Templates retrieved successfully", templates))
}

/// Fetch one template with its department skeleton.
#[utoipa::path(
    get,
    path = "/templates/{template_id}",
    params(("template_id" = i32, Path, description = "Template to retrieve")),
    responses(
        (status = 200, description = "Template found", body = TemplateResponse),
        (status = 403, description = "Template outside caller's scope"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Database error")
    ),
    tag = "Templates",
    security(("bearerAuth" = []))
)]
pub async fn get_template(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(template_id): Path<i32>,
) -> Result<ApiResponse<TemplateResponse>, ScheduleError> {
    let template = fetch_template(&pool, template_id).await?;
    require_location(&scope, template.location_id)?;
    let departments = fetch_departments(&pool, template_id).await?;
    Ok(ApiResponse::ok(
        "Template retrieved successfully",
        TemplateResponse {
            template,
            departments,
        },
    ))
}

/// Manual template creation with explicit department entries.
#[utoipa::path(
    post,
    path = "/templates",
    request_body = NewTemplate,
    responses(
        (status = 201, description = "Template created", body = TemplateResponse),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 409, description = "Empty or duplicate department list"),
        (status = 500, description = "Database error")
    ),
    tag = "Templates",
    security(("bearerAuth" = []))
)]
pub async fn create_template(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Json(payload): Json<NewTemplate>,
) -> Result<ApiResponse<TemplateResponse>, ScheduleError> {
    require_edit(&scope)?;
    require_location(&scope, payload.location_id)?;
    check_department_inputs(&payload.departments)?;

    let insert_sql = format!(
        "INSERT INTO shift_templates (name, description, location_id) \
         VALUES ($1, $2, $3) RETURNING {TEMPLATE_COLUMNS}"
    );
    let mut tx = pool.begin().await?;
    let template = sqlx::query_as::<_, ShiftTemplate>(&insert_sql)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.location_id)
        .fetch_one(&mut *tx)
        .await?;
    insert_department_inputs(&mut tx, template.id, &payload.departments).await?;
    tx.commit().await?;

    let departments = fetch_departments(&pool, template.id).await?;
    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Template created successfully",
        TemplateResponse {
            template,
            departments,
        },
    ))
}

/// "Save current day as template": snapshot the date's department structure
/// (and who was placed, as a record) into a reusable skeleton.
#[utoipa::path(
    post,
    path = "/templates/from-date",
    request_body = SaveFromDateRequest,
    responses(
        (status = 201, description = "Template saved", body = TemplateResponse),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 412, description = "Source date has no shifts"),
        (status = 500, description = "Database error")
    ),
    tag = "Templates",
    security(("bearerAuth" = []))
)]
pub async fn save_template_from_date(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Json(payload): Json<SaveFromDateRequest>,
) -> Result<ApiResponse<TemplateResponse>, ScheduleError> {
    require_edit(&scope)?;
    require_location(&scope, payload.location_id)?;

    let shifts = sqlx::query_as::<_, DepartmentShift>(
        "SELECT id, shift_date, location_id, department, start_time, end_time, \
                required_count, assigned_personnel, lead_id, created_at \
         FROM department_shifts \
         WHERE shift_date = $1 \
           AND ($2::int4 IS NULL OR location_id = $2) \
           AND ($3::int4[] IS NULL OR location_id IS NULL OR location_id = ANY($3)) \
         ORDER BY department",
    )
    .bind(payload.source_date)
    .bind(payload.location_id)
    .bind(scope.location_filter())
    .fetch_all(&pool)
    .await?;

    check_source_shifts(&shifts, payload.source_date)?;

    let insert_sql = format!(
        "INSERT INTO shift_templates (name, description, location_id) \
         VALUES ($1, $2, $3) RETURNING {TEMPLATE_COLUMNS}"
    );
    let mut tx = pool.begin().await?;
    let template = sqlx::query_as::<_, ShiftTemplate>(&insert_sql)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.location_id)
        .fetch_one(&mut *tx)
        .await?;

    for s in &shifts {
        sqlx::query(
            "INSERT INTO template_departments \
                 (template_id, name, start_time, end_time, required_count, assigned_personnel) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(template.id)
        .bind(&s.department)
        .bind(&s.start_time)
        .bind(&s.end_time)
        .bind(s.required_count)
        .bind(&s.assigned_personnel)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    let departments = fetch_departments(&pool, template.id).await?;
    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Template saved successfully",
        TemplateResponse {
            template,
            departments,
        },
    ))
}

/// Edit a template's name/description, optionally replacing its departments.
#[utoipa::path(
    patch,
    path = "/templates/{template_id}",
    params(("template_id" = i32, Path, description = "Template to update")),
    request_body = UpdateTemplate,
    responses(
        (status = 200, description = "Template updated", body = TemplateResponse),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Template not found"),
        (status = 409, description = "Empty or duplicate department list"),
        (status = 500, description = "Database error")
    ),
    tag = "Templates",
    security(("bearerAuth" = []))
)]
pub async fn update_template(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(template_id): Path<i32>,
    Json(payload): Json<UpdateTemplate>,
) -> Result<ApiResponse<TemplateResponse>, ScheduleError> {
    require_edit(&scope)?;
    let existing = fetch_template(&pool, template_id).await?;
    require_location(&scope, existing.location_id)?;

    if let Some(departments) = &payload.departments {
        check_department_inputs(departments)?;
    }

    let update_sql = format!(
        "UPDATE shift_templates \
         SET name = COALESCE($1, name), description = COALESCE($2, description) \
         WHERE id = $3 RETURNING {TEMPLATE_COLUMNS}"
    );
    let mut tx = pool.begin().await?;
    let template = sqlx::query_as::<_, ShiftTemplate>(&update_sql)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(template_id)
        .fetch_one(&mut *tx)
        .await?;

    if let Some(departments) = &payload.departments {
        sqlx::query("DELETE FROM template_departments WHERE template_id = $1")
            .bind(template_id)
            .execute(&mut *tx)
            .await?;
        insert_department_inputs(&mut tx, template_id, departments).await?;
    }
    tx.commit().await?;

    let departments = fetch_departments(&pool, template_id).await?;
    Ok(ApiResponse::ok(
        "Template updated successfully",
        TemplateResponse {
            template,
            departments,
        },
    ))
}

/// Materialize a template onto a date. Templates restage structure, not
/// people: created shifts always start with empty crew and no lead. With
/// `clear_existing` the target date (within the template's location scope)
/// is wiped first, in the same transaction.
#[utoipa::path(
    post,
    path = "/templates/{template_id}/apply",
    params(("template_id" = i32, Path, description = "Template to apply")),
    request_body = ApplyTemplateRequest,
    responses(
        (status = 200, description = "Template applied", body = Vec<DepartmentShift>),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Template not found"),
        (status = 409, description = "Template empty, or department collision without clear_existing"),
        (status = 500, description = "Database error")
    ),
    tag = "Templates",
    security(("bearerAuth" = []))
)]
pub async fn apply_template(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(template_id): Path<i32>,
    Json(payload): Json<ApplyTemplateRequest>,
) -> Result<ApiResponse<Vec<DepartmentShift>>, ScheduleError> {
    require_edit(&scope)?;
    let template = fetch_template(&pool, template_id).await?;
    require_location(&scope, template.location_id)?;

    let departments = fetch_departments(&pool, template_id).await?;
    if departments.is_empty() {
        return Err(ScheduleError::InvalidState(format!(
            "template '{}' has no departments to apply",
            template.name,
        )));
    }

    let mut tx = pool.begin().await?;
    if payload.clear_existing {
        sqlx::query(
            "DELETE FROM department_shifts \
             WHERE shift_date = $1 \
               AND ($2::int4 IS NULL OR location_id = $2) \
               AND ($3::int4[] IS NULL OR location_id IS NULL OR location_id = ANY($3))",
        )
        .bind(payload.target_date)
        .bind(template.location_id)
        .bind(scope.location_filter())
        .execute(&mut *tx)
        .await?;
    } else {
        let existing: Vec<String> = sqlx::query_scalar(
            "SELECT department FROM department_shifts \
             WHERE shift_date = $1 AND location_id IS NOT DISTINCT FROM $2",
        )
        .bind(payload.target_date)
        .bind(template.location_id)
        .fetch_all(&mut *tx)
        .await?;
        let collisions: Vec<&str> = departments
            .iter()
            .filter(|d| existing.iter().any(|e| e == &d.name))
            .map(|d| d.name.as_str())
            .collect();
        if !collisions.is_empty() {
            return Err(ScheduleError::InvalidState(format!(
                "target date {} already has departments: {}",
                payload.target_date,
                collisions.join(", "),
            )));
        }
    }

    let insert_sql = "INSERT INTO department_shifts \
             (shift_date, location_id, department, start_time, end_time, required_count) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, shift_date, location_id, department, start_time, end_time, \
                   required_count, assigned_personnel, lead_id, created_at";
    let mut created = Vec::with_capacity(departments.len());
    for d in &departments {
        let row = sqlx::query_as::<_, DepartmentShift>(insert_sql)
            .bind(payload.target_date)
            .bind(template.location_id)
            .bind(&d.name)
            .bind(&d.start_time)
            .bind(&d.end_time)
            .bind(d.required_count)
            .fetch_one(&mut *tx)
            .await?;
        created.push(row);
    }
    tx.commit().await?;

    tracing::info!(
        "applied template '{}' to {} ({} departments, clear_existing={})",
        template.name,
        payload.target_date,
        created.len(),
        payload.clear_existing
    );
    Ok(ApiResponse::ok("Template applied successfully", created))
}

/// Delete a template. Already-materialized shift rows are untouched.
#[utoipa::path(
    delete,
    path = "/templates/{template_id}",
    params(("template_id" = i32, Path, description = "Template to delete")),
    responses(
        (status = 200, description = "Template deleted"),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Database error")
    ),
    tag = "Templates",
    security(("bearerAuth" = []))
)]
pub async fn delete_template(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(template_id): Path<i32>,
) -> Result<ApiResponse<()>, ScheduleError> {
    require_edit(&scope)?;
    let template = fetch_template(&pool, template_id).await?;
    require_location(&scope, template.location_id)?;

    sqlx::query("DELETE FROM shift_templates WHERE id = $1")
        .bind(template_id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::ok("Template deleted successfully", ()))
}

// OpenAPI documentation
use utoipa::OpenApi;
#[derive(OpenApi)]
#[openapi(
    paths(
        get_templates,
        get_template,
        create_template,
        save_template_from_date,
        update_template,
        apply_template,
        delete_template
    ),
    components(
        schemas(
            ShiftTemplate,
            TemplateDepartment,
            TemplateResponse,
            TemplateDepartmentInput,
            NewTemplate,
            SaveFromDateRequest,
            UpdateTemplate,
            ApplyTemplateRequest
        )
    ),
    tags(
        (name = "Templates", description = "Reusable staffing skeletons")
    )
)]
pub struct TemplateDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn dept(name: &str) -> TemplateDepartmentInput {
        TemplateDepartmentInput {
            name: name.to_string(),
            start_time: None,
            end_time: None,
            required_count: None,
        }
    }

    #[test]
    fn empty_department_list_is_rejected() {
        assert!(matches!(
            check_department_inputs(&[]),
            Err(ScheduleError::InvalidState(_))
        ));
    }

    #[test]
    fn duplicate_department_names_are_rejected() {
        let err = check_department_inputs(&[dept("Shipping"), dept("Shipping")]).unwrap_err();
        assert!(err.to_string().contains("Shipping"));
        assert!(check_department_inputs(&[dept("Shipping"), dept("Receiving")]).is_ok());
    }

    // Scenario: "save current day as template" on a day with no shifts must
    // fail with a precondition error and create nothing.
    #[test]
    fn saving_an_empty_day_as_template_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        let err = check_source_shifts(&[], date).unwrap_err();
        assert!(matches!(err, ScheduleError::PreconditionFailed(_)));
        assert_eq!(err.status(), StatusCode::PRECONDITION_FAILED);
        assert!(err.to_string().contains("2024-06-03"));

        let staffed = DepartmentShift {
            id: 1,
            shift_date: date,
            location_id: None,
            department: "Shipping".to_string(),
            start_time: None,
            end_time: None,
            required_count: 2,
            assigned_personnel: vec![101],
            lead_id: None,
            created_at: chrono::Utc::now(),
        };
        assert!(check_source_shifts(&[staffed], date).is_ok());
    }
}
