use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// Kind of time off. Only annual leave is balance-bearing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
pub enum LeaveType {
    #[serde(rename = "연차", alias = "annual")]
    #[strum(to_string = "연차", serialize = "annual")]
    AnnualLeave,
    #[serde(rename = "병가", alias = "sick")]
    #[strum(to_string = "병가", serialize = "sick")]
    SickLeave,
    #[serde(rename = "경조사", alias = "bereavement")]
    #[strum(to_string = "경조사", serialize = "bereavement")]
    Bereavement,
    #[serde(rename = "기타", alias = "other")]
    #[strum(to_string = "기타", serialize = "other")]
    Other,
}

impl LeaveType {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn debits_balance(self) -> bool {
        matches!(self, LeaveType::AnnualLeave)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
pub enum LeaveStatus {
    #[serde(rename = "신청", alias = "requested")]
    #[strum(to_string = "신청", serialize = "requested")]
    Requested,
    #[serde(rename = "승인", alias = "approved")]
    #[strum(to_string = "승인", serialize = "approved")]
    Approved,
    #[serde(rename = "반려", alias = "rejected")]
    #[strum(to_string = "반려", serialize = "rejected")]
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Approved and rejected requests accept no further transition.
    pub fn is_terminal(self) -> bool {
        !matches!(self, LeaveStatus::Requested)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "0b7e5c4c-3f5f-4c57-9d0e-6f2b8c1a9e43",
    "employeeId": "6f1c2a4e-5d0b-4a8e-9a51-0c8f4f0d2e11",
    "startDate": "2024-10-08",
    "endDate": "2024-10-10",
    "type": "연차",
    "days": 3,
    "status": "승인",
    "reason": "가족 여행",
    "createdAt": "2024-10-01T09:00:00Z",
    "approvedAt": "2024-10-02T10:30:00Z",
    "approvedBy": "hr-admin"
}))]
pub struct LeaveRequest {
    pub id: String,

    pub employee_id: String,

    #[schema(example = "2024-10-08", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2024-10-10", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[serde(rename = "type")]
    pub leave_type: LeaveType,

    /// Inclusive day count of the range.
    #[schema(example = 3)]
    pub days: i32,

    pub status: LeaveStatus,

    pub reason: String,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "approvedAt", default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub decided_at: Option<DateTime<Utc>>,

    #[serde(rename = "approvedBy", default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,

    #[serde(rename = "rejectedReason", default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl LeaveRequest {
    pub fn from_new(id: String, new: NewLeave) -> Self {
        Self {
            id,
            employee_id: new.employee_id,
            start_date: new.start_date,
            end_date: new.end_date,
            leave_type: new.leave_type,
            days: new.days,
            status: LeaveStatus::Requested,
            reason: new.reason,
            created_at: new.created_at,
            decided_at: None,
            decided_by: None,
            rejection_reason: None,
        }
    }

    /// Whether `date` falls inside `[start_date, end_date]`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// A validated submission, ready to be persisted in state `Requested`.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub employee_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub days: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Terminal outcome requested by a decider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject { reason: String },
}

impl Decision {
    pub fn target_status(&self) -> LeaveStatus {
        match self {
            Decision::Approve => LeaveStatus::Approved,
            Decision::Reject { .. } => LeaveStatus::Rejected,
        }
    }
}

/// Store-level selection over leave requests, newest first.
#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub employee_id: Option<String>,
    pub status: Option<LeaveStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl LeaveFilter {
    pub fn approved_for(employee_id: &str) -> Self {
        Self {
            employee_id: Some(employee_id.to_string()),
            status: Some(LeaveStatus::Approved),
            ..Self::default()
        }
    }

    pub fn approved() -> Self {
        Self {
            status: Some(LeaveStatus::Approved),
            ..Self::default()
        }
    }

    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.employee_id
            .as_deref()
            .is_none_or(|id| id == request.employee_id)
            && self.status.is_none_or(|status| status == request.status)
    }
}
