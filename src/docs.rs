use utoipa::OpenApi;

use crate::leave::{
    BalanceAudit, CurrentLeaveStatus, DepartmentSummary, LeavePage, LeaveSubmission, ResetFailure,
    ResetSummary,
};
use crate::api::leave_request::{ApproveLeave, RejectLeave};
use crate::model::{Employee, LeaveRequest, LeaveStatus, LeaveType, NewEmployee};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave Ledger API",
        version = "1.0.0",
        description = r#"
## Leave balance ledger and approval workflow

- **Leave requests**: submit, list, approve or reject. A request is decided exactly once.
- **Balances**: approving annual leave (연차) debits `usedLeaves`/`remainingLeaves`;
  sick leave (병가), bereavement (경조사) and other (기타) leave never touch the balance.
- **Status**: who is on leave today, year-to-date annual days, balance audit.
- **Departments**: head-count with active / on-leave split.
- **Reset**: period boundary reset of consumed leave, reported per employee.

Conflict (409) and store unavailable (503) responses are safe to retry.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::submit_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::current_leave_status,
        crate::api::employee::annual_days,
        crate::api::employee::balance_audit,

        crate::api::summary::department_summary,
        crate::api::summary::reset_all_balances
    ),
    components(
        schemas(
            Employee,
            NewEmployee,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            LeaveSubmission,
            LeavePage,
            ApproveLeave,
            RejectLeave,
            CurrentLeaveStatus,
            BalanceAudit,
            DepartmentSummary,
            ResetSummary,
            ResetFailure
        )
    ),
    tags(
        (name = "Leave", description = "Leave request workflow APIs"),
        (name = "Employee", description = "Employee and balance APIs"),
        (name = "Department", description = "Department summary APIs"),
        (name = "Balance", description = "Period reset APIs"),
    )
)]
pub struct ApiDoc;
