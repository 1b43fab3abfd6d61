use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::leave::error::LeaveError;
use crate::leave::locks::EmployeeLocks;
use crate::model::{Employee, LeaveFilter, LeaveRequest, LeaveStatus, NewEmployee};
use crate::store::RecordStore;

pub const DEFAULT_RESET_CONCURRENCY: usize = 8;

/// Entry point for every leave ledger operation.
///
/// All writes to an employee's balance happen under that employee's lock in
/// [`EmployeeLocks`] and are committed through the store's compare-and-set
/// `save_balance`.
pub struct LeaveService {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) locks: EmployeeLocks,
    pub(crate) reset_concurrency: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeavePage {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: u64,
}

impl LeaveService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            locks: EmployeeLocks::new(),
            reset_concurrency: DEFAULT_RESET_CONCURRENCY,
        }
    }

    pub fn with_reset_concurrency(mut self, concurrency: usize) -> Self {
        self.reset_concurrency = concurrency.max(1);
        self
    }

    pub async fn create_employee(&self, new: NewEmployee) -> Result<Employee, LeaveError> {
        if new.total_leaves < 0 {
            return Err(LeaveError::InvalidEntitlement {
                field: "totalLeaves",
            });
        }
        if new.carry_over_leaves < 0 {
            return Err(LeaveError::InvalidEntitlement {
                field: "carryOverLeaves",
            });
        }
        if new.total_leaves.checked_add(new.carry_over_leaves).is_none() {
            return Err(LeaveError::InvalidEntitlement {
                field: "carryOverLeaves",
            });
        }

        let employee = self.store.create_employee(new).await?;
        tracing::info!(
            employee_id = %employee.id,
            department = %employee.department,
            remaining = employee.remaining_leaves,
            "Employee created"
        );
        Ok(employee)
    }

    pub async fn get_employee(&self, employee_id: &str) -> Result<Employee, LeaveError> {
        self.store
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| LeaveError::employee_not_found(employee_id))
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, LeaveError> {
        Ok(self.store.list_employees().await?)
    }

    pub async fn get_leave(&self, leave_id: &str) -> Result<LeaveRequest, LeaveError> {
        self.store
            .get_leave(leave_id)
            .await?
            .ok_or_else(|| LeaveError::leave_not_found(leave_id))
    }

    /// Paginated listing, newest first. `page` is 1-based, `per_page` is
    /// clamped to 1..=100.
    pub async fn list_leaves(
        &self,
        employee_id: Option<String>,
        status: Option<LeaveStatus>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<LeavePage, LeaveError> {
        let per_page = per_page.unwrap_or(10).clamp(1, 100);
        let page = page.unwrap_or(1).max(1);

        let filter = LeaveFilter {
            employee_id,
            status,
            limit: Some(per_page),
            offset: (page - 1).saturating_mul(per_page),
        };

        let total = self.store.count_leaves(&filter).await?;
        let data = self.store.list_leaves(&filter).await?;

        Ok(LeavePage {
            data,
            page,
            per_page,
            total,
        })
    }
}
