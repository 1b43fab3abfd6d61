use chrono::NaiveDate;
use futures::StreamExt;
use serde::Serialize;
use utoipa::ToSchema;

use crate::leave::error::LeaveError;
use crate::leave::ledger;
use crate::leave::service::LeaveService;
use crate::leave::workflow::balance_write_error;
use crate::model::Employee;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetFailure {
    pub employee_id: String,
    /// Error kind, e.g. `PersistenceFailure` or `Conflict`.
    pub kind: String,
    pub error: String,
}

/// Outcome of a bulk reset; `succeeded + failed` equals the number of
/// employees attempted.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    #[schema(value_type = String, format = "date")]
    pub as_of: NaiveDate,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<ResetFailure>,
}

impl LeaveService {
    /// Resets consumed leave of every employee in `employees`.
    ///
    /// Best effort: a failing employee is recorded and skipped, employees
    /// already reset stay reset. Up to `reset_concurrency` employees are
    /// processed at once, each under its own lock.
    pub async fn reset_all(&self, employees: &[Employee], as_of: NaiveDate) -> ResetSummary {
        tracing::info!(employees = employees.len(), %as_of, "Leave balance reset started");

        let outcomes: Vec<(String, Result<Employee, LeaveError>)> = futures::stream::iter(employees)
            .map(|employee| async move { (employee.id.clone(), self.reset_one(&employee.id).await) })
            .buffered(self.reset_concurrency)
            .collect()
            .await;

        let mut summary = ResetSummary {
            as_of,
            succeeded: 0,
            failed: 0,
            errors: Vec::new(),
        };

        for (employee_id, outcome) in outcomes {
            match outcome {
                Ok(_) => summary.succeeded += 1,
                Err(err) => {
                    tracing::error!(employee_id = %employee_id, error = %err, "Leave balance reset failed");
                    summary.failed += 1;
                    summary.errors.push(ResetFailure {
                        employee_id,
                        kind: err.kind().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            %as_of,
            "Leave balance reset finished"
        );

        summary
    }

    /// Resets every employee in the store. Only failing to list the
    /// employees fails the call as a whole.
    pub async fn reset_all_balances(&self, as_of: NaiveDate) -> Result<ResetSummary, LeaveError> {
        let employees = self.store.list_employees().await?;
        Ok(self.reset_all(&employees, as_of).await)
    }

    async fn reset_one(&self, employee_id: &str) -> Result<Employee, LeaveError> {
        let _guard = self.locks.lock(employee_id).await;

        let current = self.get_employee(employee_id).await?;
        let reset = ledger::apply_reset(&current);

        self.store
            .save_balance(&reset, current.balance())
            .await
            .map_err(|e| balance_write_error(e, employee_id))?;

        tracing::debug!(
            employee_id,
            released = current.used_leaves,
            remaining = reset.remaining_leaves,
            "Leave balance reset"
        );

        Ok(reset)
    }
}
