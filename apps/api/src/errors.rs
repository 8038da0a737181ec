use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::signup::{RepairError, SignupError};
use crate::auth::validation::FieldError;
use crate::identity::IdentityError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Role cannot be changed after registration")]
    RoleImmutable,

    #[error("Account creation failed: {0}")]
    IdentityCreationFailed(IdentityError),

    #[error("Profile creation failed for account {account_id}: {source}")]
    ProfileCreationFailed {
        account_id: Uuid,
        source: StoreError,
    },

    #[error("Identity provider error: {0}")]
    Identity(IdentityError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<SignupError> for AppError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::Validation(fields) => AppError::Validation(fields),
            SignupError::IdentityCreationFailed(e) => AppError::IdentityCreationFailed(e),
            SignupError::ProfileCreationFailed { account_id, source } => {
                AppError::ProfileCreationFailed { account_id, source }
            }
        }
    }
}

impl From<RepairError> for AppError {
    fn from(err: RepairError) -> Self {
        match err {
            RepairError::Validation(fields) => AppError::Validation(fields),
            RepairError::EmailMismatch => AppError::Forbidden(err.to_string()),
            RepairError::RoleMismatch { .. } => AppError::RoleImmutable,
            RepairError::AlreadyExists(_) => AppError::Conflict(err.to_string()),
            RepairError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => AppError::Unauthorized,
            other => AppError::Identity(other),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "One or more fields are invalid".to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::RoleImmutable => (
                StatusCode::CONFLICT,
                "ROLE_IMMUTABLE",
                self.to_string(),
            ),
            AppError::IdentityCreationFailed(e) => match e {
                IdentityError::DuplicateAccount => {
                    (StatusCode::CONFLICT, "DUPLICATE_ACCOUNT", e.to_string())
                }
                e if e.is_transport() => {
                    tracing::error!("Identity provider unreachable during signup: {e}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "IDENTITY_UNAVAILABLE",
                        "Could not reach the sign-up service, please try again".to_string(),
                    )
                }
                IdentityError::Rejected { message, .. } => {
                    (StatusCode::BAD_REQUEST, "IDENTITY_REJECTED", message.clone())
                }
                e => (StatusCode::BAD_REQUEST, "IDENTITY_REJECTED", e.to_string()),
            },
            AppError::ProfileCreationFailed { account_id, source } => {
                tracing::error!("Orphan account {account_id}: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROFILE_CREATION_FAILED",
                    "Your account was created but your profile could not be saved".to_string(),
                )
            }
            AppError::Identity(e) => {
                tracing::error!("Identity provider error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "IDENTITY_ERROR",
                    "The sign-in service returned an error".to_string(),
                )
            }
            AppError::Store(StoreError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
            }
            AppError::Store(StoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        }
    }

    pub fn to_body(&self) -> (StatusCode, Value) {
        let (status, code, message) = self.parts();

        let mut error = json!({
            "code": code,
            "message": message
        });
        match self {
            AppError::Validation(fields) => error["fields"] = json!(fields),
            AppError::ProfileCreationFailed { account_id, .. } => {
                error["account_id"] = json!(account_id)
            }
            _ => {}
        }

        (status, json!({ "error": error }))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_body();
        (status, Json(body)).into_response()
    }
}
