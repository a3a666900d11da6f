use axum::{routing::get, Router};
use sqlx::PgPool;

use crate::db::queries::location::get_locations;
use crate::db::queries::personnel::get_active_personnel;

/// Read-only directory routes (personnel + locations)
pub fn directory_routes() -> Router<PgPool> {
    Router::new()
        .route("/personnel", get(get_active_personnel))
        .route("/locations", get(get_locations))
}
