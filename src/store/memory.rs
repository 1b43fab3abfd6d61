use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::model::{
    Balance, Employee, LeaveFilter, LeaveRequest, LeaveStatus, NewEmployee, NewLeave,
};

/// Process-local store used when no database is configured, and by tests.
///
/// `with_latency` delays every call so that concurrent callers interleave the
/// way they would against a remote store; `fail_writes_for` makes balance
/// writes for one employee fail with a backend error.
#[derive(Default)]
pub struct MemoryStore {
    employees: RwLock<HashMap<String, Employee>>,
    leaves: RwLock<HashMap<String, LeaveRequest>>,
    failing_writes: RwLock<HashSet<String>>,
    latency: Option<Duration>,
}

fn poisoned() -> StoreError {
    StoreError::Backend("memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_writes_for(&self, employee_id: &str) {
        if let Ok(mut failing) = self.failing_writes.write() {
            failing.insert(employee_id.to_string());
        }
    }

    /// Inserts or replaces a whole employee document, bypassing the ledger.
    /// Seed data only; balance changes go through `save_balance`.
    pub fn seed_employee(&self, employee: Employee) -> Result<(), StoreError> {
        self.employees_mut()?.insert(employee.id.clone(), employee);
        Ok(())
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn employees(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Employee>>, StoreError> {
        self.employees.read().map_err(|_| poisoned())
    }

    fn employees_mut(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Employee>>, StoreError> {
        self.employees.write().map_err(|_| poisoned())
    }

    fn leaves(&self) -> Result<RwLockReadGuard<'_, HashMap<String, LeaveRequest>>, StoreError> {
        self.leaves.read().map_err(|_| poisoned())
    }

    fn leaves_mut(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, LeaveRequest>>, StoreError> {
        self.leaves.write().map_err(|_| poisoned())
    }

    fn matching(&self, filter: &LeaveFilter) -> Result<Vec<LeaveRequest>, StoreError> {
        let mut found: Vec<LeaveRequest> = self
            .leaves()?
            .values()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_employee(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        self.pause().await;
        Ok(self.employees()?.get(id).cloned())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.pause().await;
        let mut all: Vec<Employee> = self.employees()?.values().cloned().collect();
        all.sort_by(|a, b| a.join_date.cmp(&b.join_date).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn create_employee(&self, new: NewEmployee) -> Result<Employee, StoreError> {
        self.pause().await;
        let employee = Employee::from_new(Uuid::new_v4().to_string(), new);
        self.employees_mut()?
            .insert(employee.id.clone(), employee.clone());
        Ok(employee)
    }

    async fn save_balance(&self, employee: &Employee, expected: Balance) -> Result<(), StoreError> {
        self.pause().await;
        let failing = self
            .failing_writes
            .read()
            .map_err(|_| poisoned())?
            .contains(&employee.id);
        if failing {
            return Err(StoreError::Backend(format!(
                "write rejected for employee {}",
                employee.id
            )));
        }

        let mut employees = self.employees_mut()?;
        let stored = employees.get_mut(&employee.id).ok_or(StoreError::NotFound)?;
        if stored.balance() != expected {
            return Err(StoreError::Conflict);
        }
        stored.used_leaves = employee.used_leaves;
        stored.remaining_leaves = employee.remaining_leaves;
        Ok(())
    }

    async fn get_leave(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
        self.pause().await;
        Ok(self.leaves()?.get(id).cloned())
    }

    async fn list_leaves(&self, filter: &LeaveFilter) -> Result<Vec<LeaveRequest>, StoreError> {
        self.pause().await;
        let found = self.matching(filter)?;
        let page = found.into_iter().skip(filter.offset as usize);
        Ok(match filter.limit {
            Some(limit) => page.take(limit as usize).collect(),
            None => page.collect(),
        })
    }

    async fn count_leaves(&self, filter: &LeaveFilter) -> Result<u64, StoreError> {
        self.pause().await;
        Ok(self.matching(filter)?.len() as u64)
    }

    async fn create_leave(&self, new: NewLeave) -> Result<LeaveRequest, StoreError> {
        self.pause().await;
        let request = LeaveRequest::from_new(Uuid::new_v4().to_string(), new);
        self.leaves_mut()?.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn record_decision(&self, request: &LeaveRequest) -> Result<(), StoreError> {
        self.pause().await;
        let mut leaves = self.leaves_mut()?;
        let stored = leaves.get_mut(&request.id).ok_or(StoreError::NotFound)?;
        if stored.status != LeaveStatus::Requested {
            return Err(StoreError::Conflict);
        }
        stored.status = request.status;
        stored.decided_at = request.decided_at;
        stored.decided_by = request.decided_by.clone();
        stored.rejection_reason = request.rejection_reason.clone();
        Ok(())
    }
}
