use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::leave::error::LeaveError;
use crate::leave::service::LeaveService;
use crate::leave::status::current_leave_in;
use crate::model::{Employee, LeaveFilter, LeaveRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    /// Empty string groups employees without a department.
    #[schema(example = "개발팀")]
    pub department: String,
    #[schema(example = 12)]
    pub total_employees: usize,
    #[schema(example = 10)]
    pub active_count: usize,
    #[schema(example = 2)]
    pub on_leave_count: usize,
}

/// Groups employees by department in order of first appearance.
/// Every employee lands in exactly one group.
pub fn group_by_department<F>(employees: &[Employee], mut on_leave: F) -> Vec<DepartmentSummary>
where
    F: FnMut(&Employee) -> bool,
{
    let mut groups: Vec<DepartmentSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for employee in employees {
        let slot = *index.entry(employee.department.as_str()).or_insert_with(|| {
            groups.push(DepartmentSummary {
                department: employee.department.clone(),
                total_employees: 0,
                active_count: 0,
                on_leave_count: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.total_employees += 1;
        if on_leave(employee) {
            group.on_leave_count += 1;
        } else {
            group.active_count += 1;
        }
    }

    groups
}

impl LeaveService {
    /// Head-count per department with on-leave status as of `as_of`.
    pub async fn by_department(
        &self,
        employees: &[Employee],
        as_of: NaiveDate,
    ) -> Result<Vec<DepartmentSummary>, LeaveError> {
        let approved = self.store.list_leaves(&LeaveFilter::approved()).await?;

        let mut by_employee: HashMap<&str, Vec<&LeaveRequest>> = HashMap::new();
        for request in &approved {
            by_employee
                .entry(request.employee_id.as_str())
                .or_default()
                .push(request);
        }

        Ok(group_by_department(employees, |employee| {
            by_employee
                .get(employee.id.as_str())
                .and_then(|history| current_leave_in(history.iter().copied(), &employee.id, as_of))
                .is_some()
        }))
    }

    pub async fn department_summary(&self, as_of: NaiveDate) -> Result<Vec<DepartmentSummary>, LeaveError> {
        let employees = self.store.list_employees().await?;
        self.by_department(&employees, as_of).await
    }
}
