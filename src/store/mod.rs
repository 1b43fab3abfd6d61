//! Persistence boundary for employee and leave records.
//!
//! Documents are addressed by opaque string ids. There is no cross-document
//! transaction; the two conditional writes below are what the leave service
//! builds its consistency on.

use async_trait::async_trait;

use crate::model::{Balance, Employee, LeaveFilter, LeaveRequest, NewEmployee, NewLeave};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record changed since it was read")]
    Conflict,
    #[error("store unavailable: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_employee(&self, id: &str) -> Result<Option<Employee>, StoreError>;

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;

    async fn create_employee(&self, new: NewEmployee) -> Result<Employee, StoreError>;

    /// Writes `used_leaves`/`remaining_leaves` of `employee` only if the stored
    /// balance still equals `expected`; otherwise `StoreError::Conflict`.
    async fn save_balance(&self, employee: &Employee, expected: Balance) -> Result<(), StoreError>;

    async fn get_leave(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError>;

    async fn list_leaves(&self, filter: &LeaveFilter) -> Result<Vec<LeaveRequest>, StoreError>;

    /// Number of requests matching the filter, ignoring `limit`/`offset`.
    async fn count_leaves(&self, filter: &LeaveFilter) -> Result<u64, StoreError>;

    async fn create_leave(&self, new: NewLeave) -> Result<LeaveRequest, StoreError>;

    /// Persists the decision fields of `request` only if the stored request is
    /// still `Requested`; otherwise `StoreError::Conflict`.
    async fn record_decision(&self, request: &LeaveRequest) -> Result<(), StoreError>;
}
