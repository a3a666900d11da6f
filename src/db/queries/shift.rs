use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::db::models::personnel::{Personnel, UnassignedPerson};
use crate::db::models::shift::{
    AssignRequest, CopyFromDateRequest, DepartmentShift, NewDepartment, PersonRef, SetLeadRequest,
    ShiftQuery, ShiftView, TransferRequest,
};
use crate::middleware::auth::UserScope;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::ScheduleError;
use crate::utils::roster::{AssignOutcome, DayRoster, RosterShift};

const SHIFT_COLUMNS: &str = "id, shift_date, location_id, department, start_time, end_time, \
                             required_count, assigned_personnel, lead_id, created_at";

fn require_edit(scope: &UserScope) -> Result<(), ScheduleError> {
    if scope.can_edit_shifts() {
        Ok(())
    } else {
        Err(ScheduleError::ScopeViolation(
            "your role cannot edit the shift board".to_string(),
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

async fn fetch_shift(pool: &PgPool, shift_id: i32) -> Result<DepartmentShift, ScheduleError> {
    let sql = format!("SELECT {SHIFT_COLUMNS} FROM department_shifts WHERE id = $1");
    sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(shift_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ScheduleError::not_found("shift", shift_id))
}

async fn fetch_person(pool: &PgPool, person_id: i32) -> Result<Personnel, ScheduleError> {
    sqlx::query_as::<_, Personnel>(
        "SELECT id, first_name, last_name, department, location_id, status \
         FROM personnel WHERE id = $1",
    )
    .bind(person_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ScheduleError::not_found("person", person_id))
}

fn require_active(person: &Personnel) -> Result<(), ScheduleError> {
    if person.is_active() {
        Ok(())
    } else {
        Err(ScheduleError::InvalidState(format!(
            "person {} has status '{}' and cannot be scheduled",
            person.id, person.status,
        )))
    }
}

/// The whole date, across all locations: the exclusivity invariant is
/// enforced globally per day, so the roster snapshot is never scope-filtered.
async fn fetch_day_roster(pool: &PgPool, date: NaiveDate) -> Result<DayRoster, ScheduleError> {
    let sql = format!("SELECT {SHIFT_COLUMNS} FROM department_shifts WHERE shift_date = $1");
    let shifts = sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(DayRoster::new(
        shifts
            .into_iter()
            .map(|s| RosterShift {
                id: s.id,
                department: s.department,
                location_id: s.location_id,
                crew: s.assigned_personnel,
                lead_id: s.lead_id,
            })
            .collect(),
    ))
}

/// Resolve crew/lead ids to display names for the board read model.
async fn resolve_views(
    pool: &PgPool,
    shifts: Vec<DepartmentShift>,
) -> Result<Vec<ShiftView>, ScheduleError> {
    let mut ids: Vec<i32> = shifts
        .iter()
        .flat_map(|s| s.assigned_personnel.iter().copied().chain(s.lead_id))
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let people = sqlx::query_as::<_, Personnel>(
        "SELECT id, first_name, last_name, department, location_id, status \
         FROM personnel WHERE id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    let names: HashMap<i32, String> = people
        .into_iter()
        .map(|p| (p.id, p.display_name()))
        .collect();

    let person_ref = |id: i32| PersonRef {
        name: names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Person #{id}")),
        id,
    };

    Ok(shifts
        .into_iter()
        .map(|s| ShiftView {
            id: s.id,
            shift_date: s.shift_date,
            location_id: s.location_id,
            department: s.department,
            start_time: s.start_time,
            end_time: s.end_time,
            required_count: s.required_count,
            crew: s.assigned_personnel.iter().map(|p| person_ref(*p)).collect(),
            lead: s.lead_id.map(|id| person_ref(id)),
        })
        .collect())
}

/// List the day's department shifts with crew and lead resolved to names.
#[utoipa::path(
    get,
    path = "/shifts/{date}",
    params(
        ("date" = String, Path, description = "Calendar date (YYYY-MM-DD)"),
        ShiftQuery
    ),
    responses(
        (status = 200, description = "Shifts for the date", body = Vec<ShiftView>),
        (status = 403, description = "Location outside caller's scope"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn get_shifts_for_date(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(date): Path<NaiveDate>,
    Query(params): Query<ShiftQuery>,
) -> Result<ApiResponse<Vec<ShiftView>>, ScheduleError> {
    require_location(&scope, params.location_id)?;

    let sql = format!(
        "SELECT {SHIFT_COLUMNS} FROM department_shifts \
         WHERE shift_date = $1 \
           AND ($2::int4 IS NULL OR location_id = $2) \
           AND ($3::int4[] IS NULL OR location_id IS NULL OR location_id = ANY($3)) \
         ORDER BY department"
    );
    let shifts = sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(date)
        .bind(params.location_id)
        .bind(scope.location_filter())
        .fetch_all(&pool)
        .await?;

    let views = resolve_views(&pool, shifts).await?;
    Ok(ApiResponse::ok("Shifts retrieved successfully", views))
}

/// Derived view: active personnel in scope minus everyone placed on the
/// board for the date. Never persisted.
#[utoipa::path(
    get,
    path = "/shifts/{date}/unassigned",
    params(
        ("date" = String, Path, description = "Calendar date (YYYY-MM-DD)"),
        ShiftQuery
    ),
    responses(
        (status = 200, description = "Unassigned personnel pool", body = Vec<UnassignedPerson>),
        (status = 403, description = "Location outside caller's scope"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn get_unassigned(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(date): Path<NaiveDate>,
    Query(params): Query<ShiftQuery>,
) -> Result<ApiResponse<Vec<UnassignedPerson>>, ScheduleError> {
    require_location(&scope, params.location_id)?;

    let pool_rows = sqlx::query_as::<_, UnassignedPerson>(
        "SELECT p.id, p.first_name, p.last_name, p.department, p.location_id, \
                l.name AS location_name \
         FROM personnel p \
         LEFT JOIN locations l ON l.id = p.location_id \
         WHERE p.status = 'active' \
           AND ($2::int4 IS NULL OR p.location_id = $2) \
           AND ($3::int4[] IS NULL OR p.location_id IS NULL OR p.location_id = ANY($3)) \
           AND NOT EXISTS ( \
               SELECT 1 FROM department_shifts ds \
               WHERE ds.shift_date = $1 \
                 AND (p.id = ANY(ds.assigned_personnel) OR ds.lead_id = p.id)) \
         ORDER BY l.name NULLS LAST, p.last_name, p.first_name",
    )
    .bind(date)
    .bind(params.location_id)
    .bind(scope.location_filter())
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok("Unassigned pool retrieved successfully", pool_rows))
}

/// Add an empty department row for the date.
#[utoipa::path(
    post,
    path = "/shifts/{date}/departments",
    params(("date" = String, Path, description = "Calendar date (YYYY-MM-DD)")),
    request_body = NewDepartment,
    responses(
        (status = 201, description = "Department created", body = DepartmentShift),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 409, description = "Department already exists for the date"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn create_department(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(date): Path<NaiveDate>,
    Json(payload): Json<NewDepartment>,
) -> Result<ApiResponse<DepartmentShift>, ScheduleError> {
    require_edit(&scope)?;
    require_location(&scope, payload.location_id)?;

    let roster = fetch_day_roster(&pool, date).await?;
    if roster.has_department(&payload.department, payload.location_id) {
        return Err(ScheduleError::InvalidState(format!(
            "department '{}' already exists on {date}",
            payload.department,
        )));
    }

    let sql = format!(
        "INSERT INTO department_shifts \
             (shift_date, location_id, department, start_time, end_time, required_count) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {SHIFT_COLUMNS}"
    );
    let created = sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(date)
        .bind(payload.location_id)
        .bind(&payload.department)
        .bind(&payload.start_time)
        .bind(&payload.end_time)
        .bind(payload.required_count.unwrap_or(0))
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            // unique index race: two managers adding the same department
            if let sqlx::Error::Database(db) = &e {
                if db.code().as_deref() == Some("23505") {
                    return ScheduleError::InvalidState(format!(
                        "department '{}' already exists on {date}",
                        payload.department,
                    ));
                }
            }
            ScheduleError::from(e)
        })?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Department created successfully",
        created,
    ))
}

/// Remove a department row. Crew membership is derived state, so everyone
/// placed there simply reappears in the unassigned pool.
#[utoipa::path(
    delete,
    path = "/shifts/departments/{shift_id}",
    params(("shift_id" = i32, Path, description = "Shift row to delete")),
    responses(
        (status = 200, description = "Department deleted"),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Shift not found"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn delete_department(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(shift_id): Path<i32>,
) -> Result<ApiResponse<()>, ScheduleError> {
    require_edit(&scope)?;
    let shift = fetch_shift(&pool, shift_id).await?;
    require_location(&scope, shift.location_id)?;

    sqlx::query("DELETE FROM department_shifts WHERE id = $1")
        .bind(shift_id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::ok("Department deleted successfully", ()))
}

/// Add a person to a shift's crew. Fails if they already sit anywhere on
/// the board for that date; moves must go through transfer or set-lead.
#[utoipa::path(
    post,
    path = "/shifts/departments/{shift_id}/crew",
    params(("shift_id" = i32, Path, description = "Target shift")),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Person assigned", body = DepartmentShift),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Shift or person not found"),
        (status = 409, description = "Person inactive or already placed for the date"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn assign_person(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(shift_id): Path<i32>,
    Json(payload): Json<AssignRequest>,
) -> Result<ApiResponse<DepartmentShift>, ScheduleError> {
    require_edit(&scope)?;
    let shift = fetch_shift(&pool, shift_id).await?;
    require_location(&scope, shift.location_id)?;

    let person = fetch_person(&pool, payload.person_id).await?;
    require_active(&person)?;

    let roster = fetch_day_roster(&pool, shift.shift_date).await?;
    match roster.check_assign(shift_id, person.id)? {
        AssignOutcome::AlreadyCrewHere => {
            return Ok(ApiResponse::ok("Person already assigned to this shift", shift));
        }
        AssignOutcome::Add => {}
    }

    let sql = format!(
        "UPDATE department_shifts \
         SET assigned_personnel = array_append(assigned_personnel, $1) \
         WHERE id = $2 AND NOT ($1 = ANY(assigned_personnel)) \
         RETURNING {SHIFT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(person.id)
        .bind(shift_id)
        .fetch_optional(&pool)
        .await?
        .unwrap_or(shift);

    Ok(ApiResponse::ok("Person assigned successfully", updated))
}

/// Remove a person from a shift's crew. No-op if absent.
#[utoipa::path(
    delete,
    path = "/shifts/departments/{shift_id}/crew/{person_id}",
    params(
        ("shift_id" = i32, Path, description = "Shift row"),
        ("person_id" = i32, Path, description = "Person to unassign")
    ),
    responses(
        (status = 200, description = "Person unassigned", body = DepartmentShift),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Shift not found"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn unassign_person(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path((shift_id, person_id)): Path<(i32, i32)>,
) -> Result<ApiResponse<DepartmentShift>, ScheduleError> {
    require_edit(&scope)?;
    let shift = fetch_shift(&pool, shift_id).await?;
    require_location(&scope, shift.location_id)?;

    let sql = format!(
        "UPDATE department_shifts \
         SET assigned_personnel = array_remove(assigned_personnel, $1) \
         WHERE id = $2 \
         RETURNING {SHIFT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(person_id)
        .bind(shift_id)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::ok("Person unassigned successfully", updated))
}

/// Designate a lead. One transaction strips the person's crew membership
/// anywhere on the date, clears any lead slot they held elsewhere, and
/// displaces this shift's previous lead back to the pool.
#[utoipa::path(
    put,
    path = "/shifts/departments/{shift_id}/lead",
    params(("shift_id" = i32, Path, description = "Target shift")),
    request_body = SetLeadRequest,
    responses(
        (status = 200, description = "Lead set", body = DepartmentShift),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Shift or person not found"),
        (status = 409, description = "Person not active"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn set_lead(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(shift_id): Path<i32>,
    Json(payload): Json<SetLeadRequest>,
) -> Result<ApiResponse<DepartmentShift>, ScheduleError> {
    require_edit(&scope)?;
    let shift = fetch_shift(&pool, shift_id).await?;
    require_location(&scope, shift.location_id)?;

    let person = fetch_person(&pool, payload.person_id).await?;
    require_active(&person)?;

    let roster = fetch_day_roster(&pool, shift.shift_date).await?;
    let plan = roster.plan_set_lead(shift_id, person.id)?;
    if plan.is_noop() {
        return Ok(ApiResponse::ok("Person is already the lead of this shift", shift));
    }

    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE department_shifts \
         SET assigned_personnel = array_remove(assigned_personnel, $1) \
         WHERE shift_date = $2 AND $1 = ANY(assigned_personnel)",
    )
    .bind(person.id)
    .bind(shift.shift_date)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE department_shifts SET lead_id = NULL \
         WHERE shift_date = $1 AND lead_id = $2 AND id <> $3",
    )
    .bind(shift.shift_date)
    .bind(person.id)
    .bind(shift_id)
    .execute(&mut *tx)
    .await?;

    let sql = format!(
        "UPDATE department_shifts SET lead_id = $1 WHERE id = $2 RETURNING {SHIFT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(person.id)
        .bind(shift_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    let message = match plan.displaced_lead {
        Some(prior) => format!("Lead set; previous lead {prior} returned to the unassigned pool"),
        None => "Lead set successfully".to_string(),
    };
    Ok(ApiResponse::ok(message, updated))
}

/// Clear the lead slot. The former lead is not added back to any crew.
#[utoipa::path(
    delete,
    path = "/shifts/departments/{shift_id}/lead",
    params(("shift_id" = i32, Path, description = "Target shift")),
    responses(
        (status = 200, description = "Lead removed", body = DepartmentShift),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Shift not found"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn remove_lead(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Path(shift_id): Path<i32>,
) -> Result<ApiResponse<DepartmentShift>, ScheduleError> {
    require_edit(&scope)?;
    let shift = fetch_shift(&pool, shift_id).await?;
    require_location(&scope, shift.location_id)?;

    let sql = format!(
        "UPDATE department_shifts SET lead_id = NULL WHERE id = $1 RETURNING {SHIFT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(shift_id)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::ok("Lead removed successfully", updated))
}

/// Move a crew member between two departments on the same date as one
/// transaction, so a failure can never leave them half-moved.
#[utoipa::path(
    post,
    path = "/shifts/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Person transferred", body = DepartmentShift),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 404, description = "Shift not found"),
        (status = 409, description = "Shifts on different dates, or person not crew of the source"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn transfer_person(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Json(payload): Json<TransferRequest>,
) -> Result<ApiResponse<DepartmentShift>, ScheduleError> {
    require_edit(&scope)?;
    let from = fetch_shift(&pool, payload.from_shift_id).await?;
    let to = fetch_shift(&pool, payload.to_shift_id).await?;
    require_location(&scope, from.location_id)?;
    require_location(&scope, to.location_id)?;

    if from.shift_date != to.shift_date {
        return Err(ScheduleError::InvalidState(format!(
            "cannot transfer across dates ({} -> {})",
            from.shift_date, to.shift_date,
        )));
    }

    let roster = fetch_day_roster(&pool, from.shift_date).await?;
    roster.check_transfer(payload.person_id, payload.from_shift_id, payload.to_shift_id)?;

    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE department_shifts \
         SET assigned_personnel = array_remove(assigned_personnel, $1) \
         WHERE id = $2",
    )
    .bind(payload.person_id)
    .bind(payload.from_shift_id)
    .execute(&mut *tx)
    .await?;

    let sql = format!(
        "UPDATE department_shifts \
         SET assigned_personnel = array_append(assigned_personnel, $1) \
         WHERE id = $2 AND NOT ($1 = ANY(assigned_personnel)) \
         RETURNING {SHIFT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(payload.person_id)
        .bind(payload.to_shift_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(ApiResponse::ok("Person transferred successfully", updated))
}

/// Clone every shift row from one date onto another: same departments, time
/// windows, crew, and lead. Tasks are not cloned. Any department-name
/// collision on the target date rejects the whole copy, as does any copied
/// person who is already placed there that day.
#[utoipa::path(
    post,
    path = "/shifts/copy",
    request_body = CopyFromDateRequest,
    responses(
        (status = 200, description = "Shifts copied", body = Vec<DepartmentShift>),
        (status = 403, description = "Caller cannot edit this scope"),
        (status = 409, description = "Department-name or personnel collision on the target date"),
        (status = 412, description = "Source date has no shifts"),
        (status = 500, description = "Database error")
    ),
    tag = "Shifts",
    security(("bearerAuth" = []))
)]
pub async fn copy_from_date(
    State(pool): State<PgPool>,
    Extension(scope): Extension<UserScope>,
    Json(payload): Json<CopyFromDateRequest>,
) -> Result<ApiResponse<Vec<DepartmentShift>>, ScheduleError> {
    require_edit(&scope)?;
    require_location(&scope, payload.location_id)?;

    let sql = format!(
        "SELECT {SHIFT_COLUMNS} FROM department_shifts \
         WHERE shift_date = $1 \
           AND ($2::int4 IS NULL OR location_id = $2) \
           AND ($3::int4[] IS NULL OR location_id IS NULL OR location_id = ANY($3)) \
         ORDER BY department"
    );
    let source = sqlx::query_as::<_, DepartmentShift>(&sql)
        .bind(payload.source_date)
        .bind(payload.location_id)
        .bind(scope.location_filter())
        .fetch_all(&pool)
        .await?;

    if source.is_empty() {
        return Err(ScheduleError::PreconditionFailed(format!(
            "no shifts exist on {} to copy",
            payload.source_date,
        )));
    }

    let target_roster = fetch_day_roster(&pool, payload.target_date).await?;
    let collisions: Vec<&str> = source
        .iter()
        .filter(|s| target_roster.has_department(&s.department, s.location_id))
        .map(|s| s.department.as_str())
        .collect();
    if !collisions.is_empty() {
        return Err(ScheduleError::InvalidState(format!(
            "target date {} already has departments: {}",
            payload.target_date,
            collisions.join(", "),
        )));
    }

    // Names can be disjoint while the people overlap; landing a copied
    // person twice on the same day would break the one-placement rule.
    let incoming: Vec<RosterShift> = source
        .iter()
        .map(|s| RosterShift {
            id: s.id,
            department: s.department.clone(),
            location_id: s.location_id,
            crew: s.assigned_personnel.clone(),
            lead_id: s.lead_id,
        })
        .collect();
    let occupied = target_roster.occupied_people(&incoming);
    if !occupied.is_empty() {
        return Err(ScheduleError::InvalidState(format!(
            "target date {} already has these people placed: {}",
            payload.target_date,
            occupied
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )));
    }

    let insert_sql = format!(
        "INSERT INTO department_shifts \
             (shift_date, location_id, department, start_time, end_time, required_count, \
              assigned_personnel, lead_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {SHIFT_COLUMNS}"
    );
    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(source.len());
    for s in &source {
        let row = sqlx::query_as::<_, DepartmentShift>(&insert_sql)
            .bind(payload.target_date)
            .bind(s.location_id)
            .bind(&s.department)
            .bind(&s.start_time)
            .bind(&s.end_time)
            .bind(s.required_count)
            .bind(&s.assigned_personnel)
            .bind(s.lead_id)
            .fetch_one(&mut *tx)
            .await?;
        created.push(row);
    }
    tx.commit().await?;

    tracing::info!(
        "copied {} shifts from {} to {}",
        created.len(),
        payload.source_date,
        payload.target_date
    );
    Ok(ApiResponse::ok("Shifts copied successfully", created))
}

// OpenAPI documentation
use utoipa::OpenApi;
#[derive(OpenApi)]
#[openapi(
    paths(
        get_shifts_for_date,
        get_unassigned,
        create_department,
        delete_department,
        assign_person,
        unassign_person,
        set_lead,
        remove_lead,
        transfer_person,
        copy_from_date
    ),
    components(
        schemas(
            DepartmentShift,
            ShiftView,
            PersonRef,
            UnassignedPerson,
            NewDepartment,
            AssignRequest,
            SetLeadRequest,
            TransferRequest,
            CopyFromDateRequest
        )
    ),
    tags(
        (name = "Shifts", description = "Daily department shifts and personnel assignment")
    )
)]
pub struct ShiftDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: i32, status: &str) -> Personnel {
        Personnel {
            id,
            first_name: "Pat".to_string(),
            last_name: "Doe".to_string(),
            department: "Shipping".to_string(),
            location_id: None,
            status: status.to_string(),
        }
    }

    // Scenario: a terminated person must be rejected before any row is
    // touched; assign and set-lead both gate on this check first.
    #[test]
    fn terminated_personnel_cannot_be_scheduled() {
        let err = require_active(&person(7, "terminated")).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidState(_)));
        assert!(err.to_string().contains("terminated"));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        assert!(require_active(&person(7, "active")).is_ok());
        assert!(require_active(&person(7, "on_leave")).is_err());
    }
}
