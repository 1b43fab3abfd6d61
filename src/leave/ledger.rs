//! Pure arithmetic over an employee's entitlement fields.
//!
//! These two functions are the only producers of new `used_leaves` /
//! `remaining_leaves` values. Both recompute `remaining_leaves` from
//! `total + carry_over - used`, so a drifted cache is corrected on the next
//! write instead of being carried forward.

use crate::leave::error::LeaveError;
use crate::model::Employee;

/// Days the employee can still take as annual leave.
pub fn available(employee: &Employee) -> i32 {
    employee.balance().expected_remaining()
}

/// Consumes `days` of annual leave.
pub fn apply_debit(employee: &Employee, days: i32) -> Result<Employee, LeaveError> {
    let remaining = available(employee);
    if days > remaining {
        return Err(LeaveError::InsufficientBalance {
            requested: days,
            remaining,
        });
    }

    let mut debited = employee.clone();
    debited.used_leaves = employee.used_leaves + days;
    debited.remaining_leaves = remaining - days;
    Ok(debited)
}

/// Period boundary: consumption goes back to zero, entitlement is untouched.
pub fn apply_reset(employee: &Employee) -> Employee {
    let mut reset = employee.clone();
    reset.used_leaves = 0;
    reset.remaining_leaves = employee.total_leaves.saturating_add(employee.carry_over_leaves);
    reset
}
