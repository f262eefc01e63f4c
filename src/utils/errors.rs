use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::access::policy::Decision;
use crate::access::store::StoreError;

/// Application error carrying the HTTP status it maps to.
///
/// Handlers return `Result<_, AppError>`; the `IntoResponse` impl renders the
/// error as `{"error": "..."}` with the matching status code. Denied policy
/// decisions are built with [`AppError::forbidden`] or
/// [`AppError::state_conflict`] by the controllers; they are never raised from
/// inside the policy itself.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: anyhow::Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(msg.into()))
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(msg.into()))
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, anyhow::anyhow!(msg.into()))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, anyhow::anyhow!(msg.into()))
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    /// Uniqueness violation or other write conflict at the record store.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, anyhow::anyhow!(msg.into()))
    }

    /// Operation valid for the role but not for the resource's current status,
    /// e.g. deleting an alert that was already sent.
    pub fn state_conflict(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, anyhow::anyhow!(msg.into()))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, anyhow::anyhow!(msg.into()))
    }
}

/// Map a policy decision to a handler outcome. Denials stay deliberately
/// vague: the response never says whether the block was role, scope, or
/// ownership, only state conflicts get their own status so clients can react.
pub fn ensure_allowed(decision: &Decision) -> Result<(), AppError> {
    if decision.allowed {
        Ok(())
    } else if decision.is_state_conflict() {
        Err(AppError::state_conflict(
            "Operation not permitted in the resource's current state",
        ))
    } else {
        Err(AppError::forbidden("Access denied"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, status = %self.status, "request failed");
        }

        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::conflict("Record conflicts with an existing entry");
            }
        }
        AppError::database(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::not_found("Record not found"),
            StoreError::Conflict(msg) => AppError::conflict(msg),
            StoreError::Unavailable(inner) => AppError::database(inner),
        }
    }
}
