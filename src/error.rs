use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use derive_more::Display;
use serde_json::json;

use crate::model::leave_request::LeaveState;

/// Failure inside a storage backend.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "corrupt row: {}", _0)]
    Corrupt(String),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            StoreError::Corrupt(_) => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Every way a leave operation can be refused.
#[derive(Debug, Display)]
pub enum LeaveError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "end date {} is before start date {}", end, start)]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[display(fmt = "no leave balance is configured for employee {}", employee_id)]
    NotConfigured { employee_id: u64 },
    #[display(
        fmt = "requested {} days but only {} remain",
        requested,
        remaining
    )]
    InsufficientBalance { requested: u32, remaining: i64 },
    #[display(fmt = "leave request {} not found", request_id)]
    NotFound { request_id: u64 },
    #[display(fmt = "leave request {} is {} and can no longer be edited", request_id, state)]
    NotEditable { request_id: u64, state: LeaveState },
    #[display(fmt = "leave request {} is already approved", request_id)]
    AlreadyApproved { request_id: u64 },
    #[display(fmt = "leave request {} is already cancelled", request_id)]
    AlreadyCancelled { request_id: u64 },
    #[display(fmt = "not allowed to {}", _0)]
    Unauthorized(&'static str),
    #[display(fmt = "{}", _0)]
    Storage(StoreError),
}

impl std::error::Error for LeaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeaveError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for LeaveError {
    fn from(e: StoreError) -> Self {
        LeaveError::Storage(e)
    }
}

impl LeaveError {
    pub fn validation(message: impl Into<String>) -> Self {
        LeaveError::Validation(message.into())
    }

    /// Stable name of the error class, shown to callers next to the message.
    pub fn label(&self) -> &'static str {
        match self {
            LeaveError::Validation(_) => "ValidationError",
            LeaveError::InvalidRange { .. } => "InvalidRange",
            LeaveError::NotConfigured { .. } => "NotConfigured",
            LeaveError::InsufficientBalance { .. } => "InsufficientBalance",
            LeaveError::NotFound { .. } => "NotFound",
            LeaveError::NotEditable { .. } => "NotEditable",
            LeaveError::AlreadyApproved { .. } => "AlreadyApproved",
            LeaveError::AlreadyCancelled { .. } => "AlreadyCancelled",
            LeaveError::Unauthorized(_) => "Unauthorized",
            LeaveError::Storage(_) => "StorageError",
        }
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) | LeaveError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            LeaveError::Unauthorized(_) => StatusCode::FORBIDDEN,
            LeaveError::NotFound { .. } => StatusCode::NOT_FOUND,
            LeaveError::NotConfigured { .. }
            | LeaveError::InsufficientBalance { .. }
            | LeaveError::NotEditable { .. }
            | LeaveError::AlreadyApproved { .. }
            | LeaveError::AlreadyCancelled { .. } => StatusCode::CONFLICT,
            LeaveError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            LeaveError::Storage(e) => {
                tracing::error!(error = %e, "Leave storage failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.label(),
            "message": message,
        }))
    }
}
