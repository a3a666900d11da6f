use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::utils::api_response::ApiResponse;
use crate::utils::roster::RosterViolation;

/// Typed failures surfaced by every scheduling operation. Each variant maps
/// to one HTTP status through the standard response envelope.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    ScopeViolation(String),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl ScheduleError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::ScopeViolation(_) => StatusCode::FORBIDDEN,
            Self::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ScheduleError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            Self::Database(e) => {
                tracing::error!("database failure: {e}");
                Some(json!({ "error": e.to_string() }))
            }
            _ => None,
        };
        ApiResponse::<()>::error(status, self.to_string(), details).into_response()
    }
}

impl From<RosterViolation> for ScheduleError {
    fn from(v: RosterViolation) -> Self {
        match v {
            RosterViolation::UnknownShift(id) => Self::not_found("shift", id),
            RosterViolation::AlreadyPlaced {
                person_id,
                shift_id,
                as_lead,
            } => Self::InvalidState(format!(
                "person {person_id} is already {} of shift {shift_id} for this date; unassign or transfer explicitly",
                if as_lead { "lead" } else { "crew" },
            )),
            RosterViolation::NotCrewMember {
                person_id,
                shift_id,
            } => Self::InvalidState(format!(
                "person {person_id} is not a crew member of shift {shift_id}"
            )),
            RosterViolation::SameShift(id) => Self::InvalidState(format!(
                "transfer source and target are the same shift ({id})"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_expected_statuses() {
        assert_eq!(
            ScheduleError::not_found("shift", 3).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ScheduleError::InvalidState("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ScheduleError::ScopeViolation("out of scope".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ScheduleError::PreconditionFailed("nothing to save".into()).status(),
            StatusCode::PRECONDITION_FAILED
        );
    }

    #[test]
    fn roster_violations_become_typed_failures() {
        let err: ScheduleError = RosterViolation::UnknownShift(9).into();
        assert!(matches!(err, ScheduleError::NotFound(_)));

        let err: ScheduleError = RosterViolation::AlreadyPlaced {
            person_id: 1,
            shift_id: 2,
            as_lead: true,
        }
        .into();
        assert!(matches!(err, ScheduleError::InvalidState(_)));
        assert!(err.to_string().contains("lead"));
    }
}
