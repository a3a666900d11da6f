use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::template::{
    apply_template, create_template, delete_template, get_template, get_templates,
    save_template_from_date, update_template,
};

/// Template routes
pub fn template_routes() -> Router<PgPool> {
    Router::new()
        .route("/templates", get(get_templates))
        .route("/templates", post(create_template))
        .route("/templates/from-date", post(save_template_from_date))
        .route("/templates/{template_id}", get(get_template))
        .route("/templates/{template_id}", patch(update_template))
        .route("/templates/{template_id}", delete(delete_template))
        .route("/templates/{template_id}/apply", post(apply_template))
}
