use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Central error type for every handler and the workflow engine.
///
/// Validation problems stay 400 and carry a user-facing message. State
/// machine violations are 409 so the client knows to refresh its view.
/// Database failures never leak details past the log.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "Remarks are required for a final decision")]
    MissingRemarks,

    #[display(fmt = "Cannot move request from {} to {}", from, to)]
    InvalidStateTransition { from: String, to: String },

    #[display(fmt = "Request has already been finalized")]
    AlreadyFinalized,

    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),

    #[display(fmt = "Insufficient permissions")]
    Forbidden,

    #[display(fmt = "Internal Server Error")]
    Database(sqlx::Error),

    #[display(fmt = "Internal Server Error")]
    Internal(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Database(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MissingRemarks => StatusCode::BAD_REQUEST,
            ApiError::InvalidStateTransition { .. } | ApiError::AlreadyFinalized => {
                StatusCode::CONFLICT
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Database(e) => tracing::error!(error = %e, "Database error"),
            ApiError::Internal(msg) => tracing::error!(%msg, "Internal error"),
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MissingRemarks.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn state_machine_errors_are_conflicts() {
        let e = ApiError::InvalidStateTransition {
            from: "pending".into(),
            to: "pending".into(),
        };
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::AlreadyFinalized.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let e = ApiError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.to_string(), "Internal Server Error");
    }

    #[test]
    fn transition_message_names_both_states() {
        let e = ApiError::InvalidStateTransition {
            from: "in_progress".into(),
            to: "in_progress".into(),
        };
        assert!(e.to_string().contains("in_progress"));
    }
}
