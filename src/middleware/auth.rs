use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Extension, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::error;

use crate::config::Config;
use crate::utils::api_response::ApiResponse;

/// JWT claims minted by the surrounding system's auth service. This service
/// only verifies them; it never issues tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i32, std::num::ParseIntError> {
        self.sub.parse()
    }
}

/// The caller's accessible-location capability: everything, or an explicit
/// id set. Rows with no location are global and visible in every scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationScope {
    All,
    Ids(Vec<i32>),
}

impl LocationScope {
    pub fn allows(&self, location_id: Option<i32>) -> bool {
        match self {
            LocationScope::All => true,
            LocationScope::Ids(ids) => match location_id {
                None => true,
                Some(id) => ids.contains(&id),
            },
        }
    }

    /// SQL-side filter: `None` means no narrowing ("all" sentinel).
    pub fn as_filter(&self) -> Option<Vec<i32>> {
        match self {
            LocationScope::All => None,
            LocationScope::Ids(ids) => Some(ids.clone()),
        }
    }
}

/// Authorization capability attached to every request: who the caller is,
/// whether they may edit the board, and which locations they can see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserScope {
    pub user_id: i32,
    pub global_role: String,
    pub locations: LocationScope,
}

impl UserScope {
    pub fn can_edit_shifts(&self) -> bool {
        matches!(self.global_role.as_str(), "admin" | "director" | "manager")
    }

    pub fn can_access(&self, location_id: Option<i32>) -> bool {
        self.locations.allows(location_id)
    }

    pub fn location_filter(&self) -> Option<Vec<i32>> {
        self.locations.as_filter()
    }
}

pub type ScopeCache = Arc<Cache<i32, UserScope>>;

pub fn create_scope_cache() -> ScopeCache {
    Arc::new(
        Cache::builder()
            .time_to_live(Duration::from_secs(600))
            .build(),
    )
}

/// Token authentication; inserts `Claims` into request extensions.
pub async fn jwt_middleware(mut req: Request<Body>, next: Next) -> Result<Response, Response> {
    if Config::auth_disabled() {
        req.extensions_mut().insert(Claims {
            sub: "0".to_string(),
            username: "dev".to_string(),
            exp: usize::MAX,
        });
        return Ok(next.run(req).await);
    }

    let auth_header = req.headers().get("Authorization").ok_or_else(|| {
        ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Missing Authorization header", None)
            .into_response()
    })?;

    let token_str = auth_header.to_str().map_err(|_| {
        ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Invalid Authorization header format",
            None,
        )
        .into_response()
    })?;

    let token = token_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Invalid token format (missing 'Bearer ' prefix)",
            None,
        )
        .into_response()
    })?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(Config::get().jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        error!("JWT decoding failed: {e:?}");
        ApiResponse::<()>::error(
            StatusCode::UNAUTHORIZED,
            "Invalid token",
            Some(json!({ "error": e.to_string() })),
        )
        .into_response()
    })?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

/// Resolves the caller's `UserScope` (role + accessible locations) from the
/// database, cached for ten minutes per user.
pub async fn scope_middleware(
    State(db_pool): State<PgPool>,
    Extension(scope_cache): Extension<ScopeCache>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    if Config::auth_disabled() {
        req.extensions_mut().insert(UserScope {
            user_id: 0,
            global_role: "admin".to_string(),
            locations: LocationScope::All,
        });
        return Ok(next.run(req).await);
    }

    let claims = req.extensions().get::<Claims>().cloned().ok_or_else(|| {
        error!("Missing JWT claims in request");
        ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Missing JWT claims in request", None)
            .into_response()
    })?;

    let user_id: i32 = claims.user_id().map_err(|_| {
        ApiResponse::<()>::error(
            StatusCode::UNAUTHORIZED,
            "Invalid user ID format in JWT claims",
            None,
        )
        .into_response()
    })?;

    if let Some(cached) = scope_cache.get(&user_id) {
        req.extensions_mut().insert(cached);
        return Ok(next.run(req).await);
    }

    let scope = fetch_scope_from_db(user_id, &db_pool).await.map_err(|e| {
        error!("Failed to load user scope: {e:?}");
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load user permissions",
            Some(json!({ "error": e.to_string() })),
        )
        .into_response()
    })?;

    scope_cache.insert(user_id, scope.clone());
    req.extensions_mut().insert(scope);
    Ok(next.run(req).await)
}

/// Admins and directors see every location; everyone else sees exactly the
/// locations granted in `user_locations`.
async fn fetch_scope_from_db(user_id: i32, pool: &PgPool) -> Result<UserScope, sqlx::Error> {
    let global_role: Option<String> =
        sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    let global_role = global_role.unwrap_or_else(|| "viewer".to_string());

    let locations = if matches!(global_role.as_str(), "admin" | "director") {
        LocationScope::All
    } else {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT location_id FROM user_locations WHERE user_id = $1 ORDER BY location_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        LocationScope::Ids(ids)
    };

    Ok(UserScope {
        user_id,
        global_role,
        locations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_scope_allows_everything() {
        let scope = LocationScope::All;
        assert!(scope.allows(Some(1)));
        assert!(scope.allows(None));
        assert_eq!(scope.as_filter(), None);
    }

    #[test]
    fn id_scope_allows_only_granted_and_global_rows() {
        let scope = LocationScope::Ids(vec![2, 5]);
        assert!(scope.allows(Some(2)));
        assert!(!scope.allows(Some(3)));
        // Rows with no location are global and visible everywhere.
        assert!(scope.allows(None));
        assert_eq!(scope.as_filter(), Some(vec![2, 5]));
    }

    #[test]
    fn edit_rights_follow_the_global_role() {
        let mut scope = UserScope {
            user_id: 1,
            global_role: "manager".to_string(),
            locations: LocationScope::Ids(vec![1]),
        };
        assert!(scope.can_edit_shifts());
        scope.global_role = "viewer".to_string();
        assert!(!scope.can_edit_shifts());
    }
}
