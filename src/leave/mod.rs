//! Leave balance ledger and approval workflow.

pub mod aggregate;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod reset;
pub mod service;
pub mod status;
pub mod workflow;

pub use aggregate::DepartmentSummary;
pub use error::LeaveError;
pub use reset::{ResetFailure, ResetSummary};
pub use service::{LeavePage, LeaveService};
pub use status::{BalanceAudit, CurrentLeaveStatus};
pub use workflow::LeaveSubmission;
