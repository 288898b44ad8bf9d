use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::state::{pool::Position, state_machine::InvalidTransition};

/// Reasons the draft coordinator rejects an intent. A rejected intent never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// Admin-only action from a non-admin, or a pick out of turn.
    #[error("unauthorized: {0}")]
    UnauthorizedOperation(String),
    /// Team or admin secret mismatch.
    #[error("invalid credential")]
    InvalidCredential,
    /// Named player is not in the pool.
    #[error("player `{0}` is not available")]
    UnknownPlayer(String),
    /// Drafting team already holds the maximum at this position.
    #[error("team `{team}` has no room left at {position}")]
    RosterCapExceeded {
        /// Team that would exceed the cap.
        team: String,
        /// Position whose cap is reached.
        position: Position,
    },
    /// Force-edit target outside the schedule.
    #[error("pick index {0} is out of range")]
    InvalidIndex(usize),
    /// Rejected settings, such as a zero timer duration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Team name not part of the draft.
    #[error("unknown team `{0}`")]
    UnknownTeam(String),
    /// Non-admin pick while the clock is stopped.
    #[error("the draft is paused")]
    DraftPaused,
    /// The schedule has not been built yet.
    #[error("the draft has not started")]
    NotStarted,
    /// Every pick has been made.
    #[error("the draft is complete")]
    DraftCompleted,
    /// Phase change not allowed from the current phase.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

impl DraftError {
    /// Stable machine-readable reason code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            DraftError::UnauthorizedOperation(_) => "unauthorized_operation",
            DraftError::InvalidCredential => "invalid_credential",
            DraftError::UnknownPlayer(_) => "unknown_player",
            DraftError::RosterCapExceeded { .. } => "roster_cap_exceeded",
            DraftError::InvalidIndex(_) => "invalid_index",
            DraftError::InvalidConfiguration(_) => "invalid_configuration",
            DraftError::UnknownTeam(_) => "unknown_team",
            DraftError::DraftPaused => "draft_paused",
            DraftError::NotStarted => "draft_not_started",
            DraftError::DraftCompleted => "draft_completed",
            DraftError::InvalidTransition(_) => "invalid_transition",
        }
    }
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The draft coordinator refused the intent.
    #[error(transparent)]
    Rejected(#[from] DraftError),
    /// The coordinator task is gone (shutting down).
    #[error("draft coordinator unavailable")]
    Unavailable,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Unexpected failure while producing a response.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Service unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Unexpected server-side failure.
    #[error("internal error: {0}")]
    Internal(String),
    /// Draft intent rejected; keeps the reason code for the response body.
    #[error("{0}")]
    Draft(DraftError),
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected(draft) => AppError::Draft(draft),
            ServiceError::Unavailable => {
                AppError::ServiceUnavailable("draft coordinator stopped".into())
            }
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

fn draft_status(err: &DraftError) -> StatusCode {
    match err {
        DraftError::UnauthorizedOperation(_) => StatusCode::FORBIDDEN,
        DraftError::InvalidCredential => StatusCode::UNAUTHORIZED,
        DraftError::UnknownPlayer(_) | DraftError::UnknownTeam(_) => StatusCode::NOT_FOUND,
        DraftError::InvalidIndex(_) | DraftError::InvalidConfiguration(_) => {
            StatusCode::BAD_REQUEST
        }
        DraftError::RosterCapExceeded { .. }
        | DraftError::DraftPaused
        | DraftError::NotStarted
        | DraftError::DraftCompleted
        | DraftError::InvalidTransition(_) => StatusCode::CONFLICT,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, None),
            AppError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, None),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            AppError::Draft(err) => (draft_status(err), Some(err.code())),
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
            code,
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_rejections_keep_their_code_through_the_http_layer() {
        let err: AppError = ServiceError::from(DraftError::RosterCapExceeded {
            team: "Lions".into(),
            position: Position::Forward,
        })
        .into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            DraftError::UnauthorizedOperation(String::new()),
            DraftError::InvalidCredential,
            DraftError::UnknownPlayer(String::new()),
            DraftError::RosterCapExceeded {
                team: String::new(),
                position: Position::Goalkeeper,
            },
            DraftError::InvalidIndex(0),
            DraftError::InvalidConfiguration(String::new()),
            DraftError::UnknownTeam(String::new()),
            DraftError::DraftPaused,
            DraftError::NotStarted,
            DraftError::DraftCompleted,
        ];
        let mut codes: Vec<_> = errors.iter().map(DraftError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
