use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Base annual entitlement granted when none is supplied at creation.
pub const DEFAULT_TOTAL_LEAVES: i32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "6f1c2a4e-5d0b-4a8e-9a51-0c8f4f0d2e11",
        "name": "김민수",
        "department": "개발팀",
        "position": "선임",
        "joinDate": "2021-03-02",
        "totalLeaves": 15,
        "carryOverLeaves": 2,
        "usedLeaves": 3,
        "remainingLeaves": 14
    })
)]
pub struct Employee {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub department: String,

    #[serde(default)]
    pub position: String,

    #[schema(example = "2021-03-02", value_type = String, format = "date")]
    pub join_date: NaiveDate,

    #[schema(example = 15)]
    pub total_leaves: i32,

    #[schema(example = 2)]
    pub carry_over_leaves: i32,

    #[schema(example = 3)]
    pub used_leaves: i32,

    /// Cached `totalLeaves + carryOverLeaves - usedLeaves`.
    #[schema(example = 14)]
    pub remaining_leaves: i32,
}

impl Employee {
    /// Builds a fresh record with nothing consumed yet.
    pub fn from_new(id: String, new: NewEmployee) -> Self {
        Self {
            id,
            name: new.name,
            department: new.department,
            position: new.position,
            join_date: new.join_date,
            total_leaves: new.total_leaves,
            carry_over_leaves: new.carry_over_leaves,
            used_leaves: 0,
            remaining_leaves: new.total_leaves.saturating_add(new.carry_over_leaves),
        }
    }

    pub fn balance(&self) -> Balance {
        Balance {
            total: self.total_leaves,
            carry_over: self.carry_over_leaves,
            used: self.used_leaves,
            remaining: self.remaining_leaves,
        }
    }
}

/// Snapshot of the four entitlement fields, compared before a balance write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub total: i32,
    pub carry_over: i32,
    pub used: i32,
    pub remaining: i32,
}

impl Balance {
    /// Value `remaining` must hold for the record to be consistent.
    pub fn expected_remaining(&self) -> i32 {
        self.total.saturating_add(self.carry_over).saturating_sub(self.used)
    }

    pub fn is_consistent(&self) -> bool {
        self.remaining == self.expected_remaining()
    }
}

fn default_total_leaves() -> i32 {
    DEFAULT_TOTAL_LEAVES
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[serde(default)]
    #[schema(example = "김민수")]
    pub name: String,

    #[serde(default)]
    #[schema(example = "개발팀")]
    pub department: String,

    #[serde(default)]
    #[schema(example = "선임")]
    pub position: String,

    #[schema(example = "2021-03-02", value_type = String, format = "date")]
    pub join_date: NaiveDate,

    #[serde(default = "default_total_leaves")]
    #[schema(example = 15)]
    pub total_leaves: i32,

    #[serde(default)]
    #[schema(example = 2)]
    pub carry_over_leaves: i32,
}
