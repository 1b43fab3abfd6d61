//! Leave request lifecycle: `Requested` -> `Approved` | `Rejected`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::leave::error::LeaveError;
use crate::leave::ledger;
use crate::leave::service::LeaveService;
use crate::model::{Decision, Employee, LeaveRequest, LeaveStatus, LeaveType, NewLeave};
use crate::store::StoreError;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveSubmission {
    #[schema(example = "6f1c2a4e-5d0b-4a8e-9a51-0c8f4f0d2e11")]
    pub employee_id: String,

    #[schema(example = "2024-10-08", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2024-10-10", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[serde(rename = "type")]
    pub leave_type: LeaveType,

    #[schema(example = "가족 여행")]
    pub reason: String,
}

/// Inclusive number of calendar days in `[start, end]`, never less than 1.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i32 {
    let span = (end - start).num_days() + 1;
    span.clamp(1, i64::from(i32::MAX)) as i32
}

impl LeaveService {
    /// Validates and records a new request in state `Requested`.
    ///
    /// The annual-leave balance check here is advisory: nothing is reserved,
    /// and the balance is checked again under the employee lock when the
    /// request is approved.
    pub async fn submit_leave(
        &self,
        submission: LeaveSubmission,
        now: DateTime<Utc>,
    ) -> Result<LeaveRequest, LeaveError> {
        let LeaveSubmission {
            employee_id,
            start_date,
            end_date,
            leave_type,
            reason,
        } = submission;

        if end_date < start_date {
            return Err(LeaveError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }

        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(LeaveError::EmptyReason { field: "reason" });
        }

        let employee = self.get_employee(&employee_id).await?;
        let days = inclusive_days(start_date, end_date);

        if leave_type.debits_balance() {
            let remaining = ledger::available(&employee);
            if days > remaining {
                tracing::info!(
                    employee_id = %employee_id,
                    days,
                    remaining,
                    "Leave submission refused: insufficient balance"
                );
                return Err(LeaveError::InsufficientBalance {
                    requested: days,
                    remaining,
                });
            }
        }

        let request = self
            .store
            .create_leave(NewLeave {
                employee_id,
                start_date,
                end_date,
                leave_type,
                days,
                reason,
                created_at: now,
            })
            .await?;

        tracing::info!(
            leave_id = %request.id,
            employee_id = %request.employee_id,
            leave_type = %request.leave_type,
            days = request.days,
            "Leave request submitted"
        );

        Ok(request)
    }

    /// Moves a `Requested` leave request to its terminal state.
    ///
    /// Approving annual leave debits the employee's balance. The whole
    /// decision runs under the employee's lock; the balance write is a
    /// compare-and-set against the balance read under that lock, and it is
    /// undone if the request itself cannot be marked decided.
    pub async fn decide_leave(
        &self,
        request_id: &str,
        decision: Decision,
        decider_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LeaveRequest, LeaveError> {
        let rejection_reason = match &decision {
            Decision::Approve => None,
            Decision::Reject { reason } => {
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(LeaveError::EmptyReason {
                        field: "rejection reason",
                    });
                }
                Some(reason.to_string())
            }
        };

        let peek = self.get_leave(request_id).await?;
        ensure_undecided(&peek)?;

        let _guard = self.locks.lock(&peek.employee_id).await;

        // Re-read under the lock; another decider may have won the race.
        let request = self.get_leave(request_id).await?;
        ensure_undecided(&request)?;

        let mut decided = request.clone();
        decided.status = decision.target_status();
        decided.decided_at = Some(now);
        decided.decided_by = Some(decider_id.to_string());
        decided.rejection_reason = rejection_reason;

        match decision {
            Decision::Approve => {
                let employee = self.get_employee(&request.employee_id).await?;
                if request.leave_type.debits_balance() {
                    self.approve_with_debit(&employee, &decided).await?;
                } else {
                    self.commit_decision(&decided).await?;
                }
            }
            Decision::Reject { .. } => {
                self.commit_decision(&decided).await?;
            }
        }

        tracing::info!(
            leave_id = %decided.id,
            employee_id = %decided.employee_id,
            status = %decided.status,
            decided_by = decider_id,
            "Leave request decided"
        );

        Ok(decided)
    }

    async fn approve_with_debit(
        &self,
        employee: &Employee,
        decided: &LeaveRequest,
    ) -> Result<(), LeaveError> {
        let before = employee.balance();
        let debited = ledger::apply_debit(employee, decided.days)?;

        self.store
            .save_balance(&debited, before)
            .await
            .map_err(|e| balance_write_error(e, &employee.id))?;

        if let Err(err) = self.commit_decision(decided).await {
            // Undo the debit so a failed approval leaves the balance untouched.
            if let Err(undo) = self.store.save_balance(employee, debited.balance()).await {
                tracing::error!(
                    error = %undo,
                    employee_id = %employee.id,
                    leave_id = %decided.id,
                    days = decided.days,
                    "Failed to restore balance after aborted approval"
                );
            }
            return Err(err);
        }

        tracing::info!(
            employee_id = %employee.id,
            days = decided.days,
            used = debited.used_leaves,
            remaining = debited.remaining_leaves,
            "Annual leave debited"
        );

        Ok(())
    }

    async fn commit_decision(&self, decided: &LeaveRequest) -> Result<(), LeaveError> {
        match self.store.record_decision(decided).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(LeaveError::leave_not_found(&decided.id)),
            Err(StoreError::Conflict) => {
                let status = self
                    .store
                    .get_leave(&decided.id)
                    .await?
                    .map(|stored| stored.status)
                    .ok_or_else(|| LeaveError::leave_not_found(&decided.id))?;
                tracing::warn!(leave_id = %decided.id, status = %status, "Leave request decided elsewhere");
                Err(LeaveError::AlreadyDecided {
                    id: decided.id.clone(),
                    status,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn ensure_undecided(request: &LeaveRequest) -> Result<(), LeaveError> {
    if request.status.is_terminal() {
        tracing::warn!(
            leave_id = %request.id,
            status = %request.status,
            "Refusing to decide a terminal leave request"
        );
        return Err(LeaveError::AlreadyDecided {
            id: request.id.clone(),
            status: request.status,
        });
    }
    debug_assert_eq!(request.status, LeaveStatus::Requested);
    Ok(())
}

/// Maps a failed balance write to the caller-facing error.
pub(crate) fn balance_write_error(err: StoreError, employee_id: &str) -> LeaveError {
    match err {
        StoreError::Conflict => LeaveError::Conflict {
            employee_id: employee_id.to_string(),
        },
        StoreError::NotFound => LeaveError::employee_not_found(employee_id),
        StoreError::Backend(message) => LeaveError::PersistenceFailure { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_request_counts_one_day() {
        assert_eq!(inclusive_days(date(2024, 10, 8), date(2024, 10, 8)), 1);
    }

    #[test]
    fn range_is_counted_inclusively() {
        assert_eq!(inclusive_days(date(2024, 10, 8), date(2024, 10, 10)), 3);
        assert_eq!(inclusive_days(date(2024, 2, 28), date(2024, 3, 1)), 3);
    }

    #[test]
    fn reversed_range_never_counts_below_one() {
        assert_eq!(inclusive_days(date(2024, 10, 10), date(2024, 10, 8)), 1);
    }
}
