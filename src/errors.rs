use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::models::ScheduleError;

#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub error_code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error_code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(code: &str, message: &str, details: serde_json::Value) -> Self {
        Self {
            error_code: code.to_string(),
            message: message.to_string(),
            details: Some(details),
        }
    }
}

#[derive(Error, Debug)]
pub enum GymError {
    #[error("Permission denied")]
    PermissionDenied,
    #[error("{0}")]
    RoleNotAllowed(&'static str),
    #[error("Client profile not found. Create a profile first.")]
    ClientProfileMissing,
    #[error("Trainer profile not found. Contact an administrator.")]
    TrainerProfileMissing,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Insufficient balance: {balance} available, {price} required")]
    InsufficientBalance { balance: Decimal, price: Decimal },
    #[error("An active subscription is required to assign a trainer")]
    NoActiveSubscription,
    #[error("A subscription is required to view training sessions")]
    NoSubscription,
    #[error("Trainer {0} has no free places")]
    TrainerAtCapacity(String),
    #[error("You have no assigned trainer")]
    NoAssignedTrainer,
    #[error("Session is full, choose another one")]
    SessionFull,
    #[error("You can only register for sessions of your trainer")]
    ForeignSession,
    #[error("Session not found or not planned")]
    SessionNotPlanned,
    #[error("Session not found, not completed, or not yours")]
    SessionNotCompleted,
    #[error("Client is not registered for this session")]
    NotRegistered,
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("Invalid request body: {0}")]
    JsonBody(#[from] JsonRejection),
    #[error("Invalid path: {0}")]
    Path(#[from] PathRejection),
    #[error("Invalid query: {0}")]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl GymError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GymError::PermissionDenied | GymError::RoleNotAllowed(_) => StatusCode::FORBIDDEN,
            GymError::ClientProfileMissing
            | GymError::TrainerProfileMissing
            | GymError::NotFound(_) => StatusCode::NOT_FOUND,
            GymError::Conflict(_) => StatusCode::CONFLICT,
            GymError::InsufficientBalance { .. }
            | GymError::NoActiveSubscription
            | GymError::NoSubscription
            | GymError::TrainerAtCapacity(_)
            | GymError::NoAssignedTrainer
            | GymError::SessionFull
            | GymError::ForeignSession
            | GymError::SessionNotPlanned
            | GymError::SessionNotCompleted
            | GymError::NotRegistered
            | GymError::Schedule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GymError::InvalidInput(_)
            | GymError::Validation(_)
            | GymError::JsonBody(_)
            | GymError::Path(_)
            | GymError::Query(_) => StatusCode::BAD_REQUEST,
            GymError::Auth(_) => StatusCode::UNAUTHORIZED,
            GymError::Database(_) | GymError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GymError::PermissionDenied => "PERMISSION_DENIED",
            GymError::RoleNotAllowed(_) => "ROLE_NOT_ALLOWED",
            GymError::ClientProfileMissing => "CLIENT_PROFILE_MISSING",
            GymError::TrainerProfileMissing => "TRAINER_PROFILE_MISSING",
            GymError::NotFound(_) => "NOT_FOUND",
            GymError::Conflict(_) => "CONFLICT",
            GymError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            GymError::NoActiveSubscription => "NO_ACTIVE_SUBSCRIPTION",
            GymError::NoSubscription => "NO_SUBSCRIPTION",
            GymError::TrainerAtCapacity(_) => "TRAINER_AT_CAPACITY",
            GymError::NoAssignedTrainer => "NO_ASSIGNED_TRAINER",
            GymError::SessionFull => "SESSION_FULL",
            GymError::ForeignSession => "FOREIGN_SESSION",
            GymError::SessionNotPlanned => "SESSION_NOT_PLANNED",
            GymError::SessionNotCompleted => "SESSION_NOT_COMPLETED",
            GymError::NotRegistered => "NOT_REGISTERED",
            GymError::Schedule(_) => "SCHEDULE_ERROR",
            GymError::InvalidInput(_) => "INVALID_INPUT",
            GymError::Validation(_) => "VALIDATION_ERROR",
            GymError::JsonBody(_) => "INVALID_BODY",
            GymError::Path(_) => "INVALID_PATH",
            GymError::Query(_) => "INVALID_QUERY",
            GymError::Auth(_) => "AUTH_ERROR",
            GymError::Database(_) => "DATABASE_ERROR",
            GymError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl GymError {
    /// Business-rule refusals, as opposed to malformed input or server faults
    pub fn is_rule_rejection(&self) -> bool {
        matches!(
            self,
            GymError::Conflict(_)
                | GymError::InsufficientBalance { .. }
                | GymError::NoActiveSubscription
                | GymError::NoSubscription
                | GymError::TrainerAtCapacity(_)
                | GymError::NoAssignedTrainer
                | GymError::SessionFull
                | GymError::ForeignSession
                | GymError::SessionNotPlanned
                | GymError::SessionNotCompleted
                | GymError::NotRegistered
                | GymError::Schedule(_)
        )
    }
}

impl IntoResponse for GymError {
    fn into_response(self) -> Response {
        let body = match self {
            GymError::Auth(auth_error) => return auth_error.into_response(),
            GymError::Database(ref err) => {
                tracing::error!("Database error: {}", err);
                ApiError::new(self.error_code(), "Database error")
            }
            GymError::Internal(ref err) => {
                tracing::error!("Internal error: {:#}", err);
                ApiError::new(self.error_code(), "Internal server error")
            }
            GymError::Validation(ref errors) => ApiError::with_details(
                self.error_code(),
                "Invalid request data",
                json!({ "errors": errors.to_string() }),
            ),
            _ => {
                if self.is_rule_rejection() {
                    tracing::warn!("Rejected ({}): {}", self.error_code(), self);
                }
                ApiError::new(self.error_code(), &self.to_string())
            }
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Maps a unique-constraint violation to `GymError::Conflict` with the given message.
pub fn on_unique_violation(message: &'static str) -> impl FnOnce(sqlx::Error) -> GymError {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            GymError::Conflict(message.to_string())
        }
        _ => GymError::Database(err),
    }
}

/// Maps a restricting foreign-key violation, e.g. deleting a catalog row still in use.
pub fn on_foreign_key_violation(message: &'static str) -> impl FnOnce(sqlx::Error) -> GymError {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            GymError::Conflict(message.to_string())
        }
        _ => GymError::Database(err),
    }
}

/// Maps a dangling reference on insert or update to `InvalidInput`, and a
/// unique violation to `Conflict`.
pub fn on_reference_violation(
    unknown: &'static str,
    duplicate: &'static str,
) -> impl FnOnce(sqlx::Error) -> GymError {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            GymError::InvalidInput(unknown.to_string())
        }
        _ => on_unique_violation(duplicate)(err),
    }
}

pub type GymResult<T> = Result<T, GymError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_business_rule_status_codes() {
        let err = GymError::InsufficientBalance {
            balance: dec!(100),
            price: dec!(250),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
        assert_eq!(
            err.to_string(),
            "Insufficient balance: 100 available, 250 required"
        );

        assert_eq!(GymError::SessionFull.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(GymError::PermissionDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(GymError::NotFound("Client").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(GymError::NotFound("Client").to_string(), "Client not found");
    }

    #[test]
    fn test_rule_rejections() {
        assert!(GymError::SessionFull.is_rule_rejection());
        assert!(GymError::TrainerAtCapacity("Ann Lee".to_string()).is_rule_rejection());
        assert!(GymError::Conflict("duplicate".to_string()).is_rule_rejection());
        assert!(!GymError::PermissionDenied.is_rule_rejection());
        assert!(!GymError::InvalidInput("bad".to_string()).is_rule_rejection());
        assert!(!GymError::Database(sqlx::Error::RowNotFound).is_rule_rejection());
    }

    #[test]
    fn test_foreign_key_mapper_passes_other_errors_through() {
        let err = on_reference_violation("Unknown trainer", "duplicate")(sqlx::Error::RowNotFound);
        assert!(matches!(err, GymError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_non_unique_database_errors_pass_through() {
        let err = on_unique_violation("duplicate")(sqlx::Error::RowNotFound);
        assert!(matches!(err, GymError::Database(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = GymError::Conflict("Goal already added for this date".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error_code"], "CONFLICT");
        assert_eq!(json["message"], "Goal already added for this date");
    }
}
