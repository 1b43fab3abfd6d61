use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::NaiveDate;
use serde_json::json;

use crate::model::LeaveStatus;
use crate::store::StoreError;

/// Failures of the leave ledger operations.
///
/// Validation and state-machine errors are raised before anything is written.
/// `Conflict` and `PersistenceFailure` are the only kinds worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaveError {
    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("{field} must not be blank")]
    EmptyReason { field: &'static str },

    #[error("{field} is out of range")]
    InvalidEntitlement { field: &'static str },

    #[error("requested {requested} day(s) but only {remaining} remaining")]
    InsufficientBalance { requested: i32, remaining: i32 },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("leave request {id} is already {status}")]
    AlreadyDecided { id: String, status: LeaveStatus },

    #[error("balance of employee {employee_id} changed concurrently, retry")]
    Conflict { employee_id: String },

    #[error("persistence failure: {message}")]
    PersistenceFailure { message: String },
}

impl LeaveError {
    pub fn employee_not_found(id: &str) -> Self {
        LeaveError::NotFound {
            entity: "employee",
            id: id.to_string(),
        }
    }

    pub fn leave_not_found(id: &str) -> Self {
        LeaveError::NotFound {
            entity: "leave request",
            id: id.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LeaveError::Conflict { .. } | LeaveError::PersistenceFailure { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LeaveError::InvalidRange { .. } => "InvalidRange",
            LeaveError::EmptyReason { .. } => "EmptyReason",
            LeaveError::InvalidEntitlement { .. } => "InvalidEntitlement",
            LeaveError::InsufficientBalance { .. } => "InsufficientBalance",
            LeaveError::NotFound { .. } => "NotFound",
            LeaveError::AlreadyDecided { .. } => "AlreadyDecided",
            LeaveError::Conflict { .. } => "Conflict",
            LeaveError::PersistenceFailure { .. } => "PersistenceFailure",
        }
    }
}

impl From<StoreError> for LeaveError {
    fn from(value: StoreError) -> Self {
        LeaveError::PersistenceFailure {
            message: value.to_string(),
        }
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::InvalidRange { .. }
            | LeaveError::EmptyReason { .. }
            | LeaveError::InvalidEntitlement { .. } => StatusCode::BAD_REQUEST,
            LeaveError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LeaveError::NotFound { .. } => StatusCode::NOT_FOUND,
            LeaveError::AlreadyDecided { .. } | LeaveError::Conflict { .. } => StatusCode::CONFLICT,
            LeaveError::PersistenceFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        }))
    }
}
