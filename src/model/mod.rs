pub mod employee;
pub mod leave_request;

pub use employee::{Balance, Employee, NewEmployee};
pub use leave_request::{Decision, LeaveFilter, LeaveRequest, LeaveStatus, LeaveType, NewLeave};
