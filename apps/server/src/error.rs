use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use turnstile_db::DbError;

/// Central error type for the Turnstile API.
///
/// Conflict (409) is not here: a failed reservation is a normal outcome
/// with an endpoint-specific body, built by the handler that knows its
/// wire shape.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::Invalid(_) => ApiError::BadRequest(err.to_string()),
            // Contention exhausted its retries; the client may retry with
            // backoff.
            DbError::Busy => ApiError::ServiceUnavailable(err.to_string()),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg, "SERVICE_UNAVAILABLE")
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_map_to_expected_statuses() {
        let cases = [
            (DbError::not_found("Event", "evt-1"), StatusCode::NOT_FOUND),
            (DbError::Busy, StatusCode::SERVICE_UNAVAILABLE),
            (
                DbError::UniqueViolation {
                    field: "id".into(),
                    value: "unknown".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (db_err, expected) in cases {
            let response = ApiError::from(db_err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn busy_maps_to_service_unavailable_variant() {
        assert!(matches!(
            ApiError::from(DbError::Busy),
            ApiError::ServiceUnavailable(_)
        ));
    }
}
