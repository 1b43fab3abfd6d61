//! On-demand derivation of "who is on leave" and year-to-date usage.
//!
//! Both answers are recomputed from approved request history rather than read
//! from the cached balance fields.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::leave::error::LeaveError;
use crate::leave::service::LeaveService;
use crate::model::{LeaveFilter, LeaveRequest, LeaveStatus};

/// The approved request of `employee_id` covering `as_of`, if any.
///
/// Overlapping approvals are not prevented structurally; the one decided
/// earliest wins.
pub fn current_leave_in<'a, I>(requests: I, employee_id: &str, as_of: NaiveDate) -> Option<&'a LeaveRequest>
where
    I: IntoIterator<Item = &'a LeaveRequest>,
{
    requests
        .into_iter()
        .filter(|r| r.employee_id == employee_id)
        .filter(|r| r.status == LeaveStatus::Approved)
        .filter(|r| r.covers(as_of))
        .min_by(|a, b| a.decided_at.cmp(&b.decided_at).then_with(|| a.id.cmp(&b.id)))
}

/// Sum of approved annual-leave days whose start date falls in `year`.
pub fn annual_days_in_year<'a, I>(requests: I, employee_id: &str, year: i32) -> i32
where
    I: IntoIterator<Item = &'a LeaveRequest>,
{
    requests
        .into_iter()
        .filter(|r| r.employee_id == employee_id)
        .filter(|r| r.status == LeaveStatus::Approved)
        .filter(|r| r.leave_type.debits_balance())
        .filter(|r| r.start_date.year() == year)
        .map(|r| r.days)
        .sum()
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentLeaveStatus {
    pub employee_id: String,
    #[schema(value_type = String, format = "date")]
    pub as_of: NaiveDate,
    pub on_leave: bool,
    pub leave: Option<LeaveRequest>,
}

/// Cached balance compared against the approval history.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAudit {
    pub employee_id: String,
    pub year: i32,
    pub used_leaves: i32,
    pub remaining_leaves: i32,
    pub year_to_date_annual_days: i32,
    /// `remainingLeaves == totalLeaves + carryOverLeaves - usedLeaves`
    pub formula_holds: bool,
    /// `usedLeaves` equals the recomputed year-to-date total
    pub matches_history: bool,
    /// Both checks above hold.
    pub consistent: bool,
}

impl LeaveService {
    pub async fn current_leave(
        &self,
        employee_id: &str,
        as_of: NaiveDate,
    ) -> Result<Option<LeaveRequest>, LeaveError> {
        let approved = self
            .store
            .list_leaves(&LeaveFilter::approved_for(employee_id))
            .await?;

        Ok(current_leave_in(&approved, employee_id, as_of).cloned())
    }

    pub async fn current_leave_status(
        &self,
        employee_id: &str,
        as_of: NaiveDate,
    ) -> Result<CurrentLeaveStatus, LeaveError> {
        self.get_employee(employee_id).await?;
        let leave = self.current_leave(employee_id, as_of).await?;

        Ok(CurrentLeaveStatus {
            employee_id: employee_id.to_string(),
            as_of,
            on_leave: leave.is_some(),
            leave,
        })
    }

    pub async fn year_to_date_annual_days(&self, employee_id: &str, year: i32) -> Result<i32, LeaveError> {
        let approved = self
            .store
            .list_leaves(&LeaveFilter::approved_for(employee_id))
            .await?;

        Ok(annual_days_in_year(&approved, employee_id, year))
    }

    pub async fn balance_audit(&self, employee_id: &str, year: i32) -> Result<BalanceAudit, LeaveError> {
        let employee = self.get_employee(employee_id).await?;
        let history = self.year_to_date_annual_days(employee_id, year).await?;

        let formula_holds = employee.balance().is_consistent();
        let matches_history = employee.used_leaves == history;
        let audit = BalanceAudit {
            employee_id: employee.id.clone(),
            year,
            used_leaves: employee.used_leaves,
            remaining_leaves: employee.remaining_leaves,
            year_to_date_annual_days: history,
            formula_holds,
            matches_history,
            consistent: formula_holds && matches_history,
        };

        if !audit.consistent {
            tracing::warn!(
                employee_id = %audit.employee_id,
                year,
                used = audit.used_leaves,
                remaining = audit.remaining_leaves,
                history,
                "Leave balance drifted from history"
            );
        }

        Ok(audit)
    }
}
