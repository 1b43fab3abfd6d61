use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::model::{
    Balance, Employee, LeaveFilter, LeaveRequest, LeaveStatus, LeaveType, NewEmployee, NewLeave,
};

/// Record store backed by the `employees` and `leaves` MySQL tables.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct EmployeeRow {
    id: String,
    name: String,
    department: String,
    position: String,
    join_date: NaiveDate,
    total_leaves: i32,
    carry_over_leaves: i32,
    used_leaves: i32,
    remaining_leaves: i32,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            name: row.name,
            department: row.department,
            position: row.position,
            join_date: row.join_date,
            total_leaves: row.total_leaves,
            carry_over_leaves: row.carry_over_leaves,
            used_leaves: row.used_leaves,
            remaining_leaves: row.remaining_leaves,
        }
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: String,
    employee_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    leave_type: String,
    days: i32,
    status: String,
    reason: String,
    created_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<String>,
    rejected_reason: Option<String>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let leave_type = LeaveType::from_str(&row.leave_type).map_err(|_| {
            StoreError::Backend(format!("unknown leave type {:?} on {}", row.leave_type, row.id))
        })?;
        let status = LeaveStatus::from_str(&row.status).map_err(|_| {
            StoreError::Backend(format!("unknown leave status {:?} on {}", row.status, row.id))
        })?;

        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            start_date: row.start_date,
            end_date: row.end_date,
            leave_type,
            days: row.days,
            status,
            reason: row.reason,
            created_at: row.created_at,
            decided_at: row.approved_at,
            decided_by: row.approved_by,
            rejection_reason: row.rejected_reason,
        })
    }
}

const EMPLOYEE_COLUMNS: &str = "id, name, department, position, join_date, \
     total_leaves, carry_over_leaves, used_leaves, remaining_leaves";

const LEAVE_COLUMNS: &str = "id, employee_id, start_date, end_date, leave_type, days, status, \
     reason, created_at, approved_at, approved_by, rejected_reason";

fn where_clause(filter: &LeaveFilter) -> (String, Vec<&str>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(employee_id) = filter.employee_id.as_deref() {
        where_sql.push_str(" AND employee_id = ?");
        args.push(employee_id);
    }

    if let Some(status) = filter.status {
        where_sql.push_str(" AND status = ?");
        args.push(status.as_str());
    }

    (where_sql, args)
}

/// Outcome of a guarded balance `UPDATE` that matched no row.
///
/// Only a write that changes nothing and finds the row still at `expected`
/// succeeds; a row that moved away from `expected` is a conflict even when it
/// already holds `target`.
fn unmatched_balance_write(
    stored: Option<Balance>,
    expected: Balance,
    target: Balance,
) -> Result<(), StoreError> {
    match stored {
        None => Err(StoreError::NotFound),
        Some(stored) if target == expected && stored == expected => Ok(()),
        Some(_) => Err(StoreError::Conflict),
    }
}

#[async_trait]
impl RecordStore for MySqlStore {
    async fn get_employee(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, employee_id = id, "Failed to fetch employee");
                StoreError::from(e)
            })?;

        Ok(row.map(Employee::from))
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY join_date, id");
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to list employees");
                StoreError::from(e)
            })?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn create_employee(&self, new: NewEmployee) -> Result<Employee, StoreError> {
        let employee = Employee::from_new(Uuid::new_v4().to_string(), new);

        sqlx::query(
            r#"
            INSERT INTO employees
                (id, name, department, position, join_date,
                 total_leaves, carry_over_leaves, used_leaves, remaining_leaves)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.name)
        .bind(&employee.department)
        .bind(&employee.position)
        .bind(employee.join_date)
        .bind(employee.total_leaves)
        .bind(employee.carry_over_leaves)
        .bind(employee.used_leaves)
        .bind(employee.remaining_leaves)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create employee");
            StoreError::from(e)
        })?;

        Ok(employee)
    }

    async fn save_balance(&self, employee: &Employee, expected: Balance) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET used_leaves = ?, remaining_leaves = ?
            WHERE id = ?
            AND total_leaves = ? AND carry_over_leaves = ?
            AND used_leaves = ? AND remaining_leaves = ?
            "#,
        )
        .bind(employee.used_leaves)
        .bind(employee.remaining_leaves)
        .bind(&employee.id)
        .bind(expected.total)
        .bind(expected.carry_over)
        .bind(expected.used)
        .bind(expected.remaining)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = %employee.id, "Balance update failed");
            StoreError::from(e)
        })?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let stored = self.get_employee(&employee.id).await?;
        unmatched_balance_write(stored.map(|e| e.balance()), expected, employee.balance())
    }

    async fn get_leave(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leaves WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, leave_id = id, "Failed to fetch leave request");
                StoreError::from(e)
            })?;

        row.map(LeaveRequest::try_from).transpose()
    }

    async fn list_leaves(&self, filter: &LeaveFilter) -> Result<Vec<LeaveRequest>, StoreError> {
        let (where_sql, args) = where_clause(filter);
        let mut data_sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leaves{where_sql} ORDER BY created_at DESC, id"
        );
        if filter.limit.is_some() {
            data_sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut data_q = sqlx::query_as::<_, LeaveRow>(&data_sql);
        for arg in args {
            data_q = data_q.bind(arg);
        }
        if let Some(limit) = filter.limit {
            data_q = data_q.bind(limit).bind(filter.offset);
        }

        let rows = data_q.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            StoreError::from(e)
        })?;

        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn count_leaves(&self, filter: &LeaveFilter) -> Result<u64, StoreError> {
        let (where_sql, args) = where_clause(filter);
        let count_sql = format!("SELECT COUNT(*) FROM leaves{where_sql}");

        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in args {
            count_q = count_q.bind(arg);
        }

        let total = count_q.fetch_one(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to count leave requests");
            StoreError::from(e)
        })?;

        Ok(total.max(0) as u64)
    }

    async fn create_leave(&self, new: NewLeave) -> Result<LeaveRequest, StoreError> {
        let request = LeaveRequest::from_new(Uuid::new_v4().to_string(), new);

        sqlx::query(
            r#"
            INSERT INTO leaves
                (id, employee_id, start_date, end_date, leave_type, days, status, reason, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(&request.employee_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.leave_type.as_str())
        .bind(request.days)
        .bind(request.status.as_str())
        .bind(&request.reason)
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = %request.employee_id, "Failed to create leave request");
            StoreError::from(e)
        })?;

        Ok(request)
    }

    async fn record_decision(&self, request: &LeaveRequest) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leaves
            SET status = ?, approved_at = ?, approved_by = ?, rejected_reason = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(request.status.as_str())
        .bind(request.decided_at)
        .bind(request.decided_by.as_deref())
        .bind(request.rejection_reason.as_deref())
        .bind(&request.id)
        .bind(LeaveStatus::Requested.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id = %request.id, "Recording leave decision failed");
            StoreError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return match self.get_leave(&request.id).await? {
                None => Err(StoreError::NotFound),
                Some(_) => Err(StoreError::Conflict),
            };
        }

        Ok(())
    }
}
