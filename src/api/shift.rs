use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::shift::{
    assign_person, copy_from_date, create_department, delete_department, get_shifts_for_date,
    get_unassigned, remove_lead, set_lead, transfer_person, unassign_person,
};

/// Assignment-board routes, mounted behind the JWT + scope middleware.
pub fn shift_routes() -> Router<PgPool> {
    Router::new()
        // Read the board for a date
        .route("/shifts/{date}", get(get_shifts_for_date))
        // Derived unassigned pool
        .route("/shifts/{date}/unassigned", get(get_unassigned))
        // Add / remove department columns
        .route("/shifts/{date}/departments", post(create_department))
        .route("/shifts/departments/{shift_id}", delete(delete_department))
        // Crew membership
        .route("/shifts/departments/{shift_id}/crew", post(assign_person))
        .route(
            "/shifts/departments/{shift_id}/crew/{person_id}",
            delete(unassign_person),
        )
        // Lead designation
        .route("/shifts/departments/{shift_id}/lead", put(set_lead))
        .route("/shifts/departments/{shift_id}/lead", delete(remove_lead))
        // Cross-department move and day cloning
        .route("/shifts/transfer", post(transfer_person))
        .route("/shifts/copy", post(copy_from_date))
}
