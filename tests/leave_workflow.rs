mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::*;
use hrm_leave::leave::{LeaveError, LeaveService};
use hrm_leave::model::{
    Balance, Decision, Employee, LeaveFilter, LeaveRequest, LeaveStatus, LeaveType, NewEmployee,
    NewLeave,
};
use hrm_leave::store::{MemoryStore, RecordStore, StoreError};

#[tokio::test]
async fn approved_annual_leave_debits_the_balance() {
    let (store, service) = service();
    let employee = hire(&service, "개발팀", 15, 2).await;

    let request = service
        .submit_leave(
            submission(&employee.id, date(2024, 10, 8), date(2024, 10, 10), LeaveType::AnnualLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap();
    assert_eq!(request.days, 3);
    assert_eq!(request.status, LeaveStatus::Requested);

    let decided = service
        .decide_leave(&request.id, Decision::Approve, "hr-admin", at(2024, 10, 2, 10))
        .await
        .unwrap();
    assert_eq!(decided.status, LeaveStatus::Approved);
    assert_eq!(decided.decided_by.as_deref(), Some("hr-admin"));
    assert_eq!(decided.decided_at, Some(at(2024, 10, 2, 10)));

    let after = store.get_employee(&employee.id).await.unwrap().unwrap();
    assert_eq!(after.used_leaves, 3);
    assert_eq!(after.remaining_leaves, 14);
    assert!(after.balance().is_consistent());

    let stored = store.get_leave(&request.id).await.unwrap().unwrap();
    assert_eq!(stored, decided);
}

#[tokio::test]
async fn oversized_annual_request_is_refused_without_creating_anything() {
    let (store, service) = service();
    let employee = hire(&service, "개발팀", 15, 2).await;
    let first = service
        .submit_leave(
            submission(&employee.id, date(2024, 10, 8), date(2024, 10, 10), LeaveType::AnnualLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap();
    service
        .decide_leave(&first.id, Decision::Approve, "hr-admin", at(2024, 10, 2, 10))
        .await
        .unwrap();

    let err = service
        .submit_leave(
            submission(&employee.id, date(2024, 11, 1), date(2024, 11, 20), LeaveType::AnnualLeave),
            at(2024, 10, 3, 9),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LeaveError::InsufficientBalance {
            requested: 20,
            remaining: 14
        }
    );
    assert_eq!(store.count_leaves(&LeaveFilter::default()).await.unwrap(), 1);
}

#[tokio::test]
async fn reversed_range_is_refused() {
    let (store, service) = service();
    let employee = hire(&service, "개발팀", 15, 0).await;

    let err = service
        .submit_leave(
            submission(&employee.id, date(2024, 10, 10), date(2024, 10, 8), LeaveType::SickLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::InvalidRange { .. }));
    assert!(!err.is_retryable());
    assert_eq!(store.count_leaves(&LeaveFilter::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn blank_reason_is_refused() {
    let (_, service) = service();
    let employee = hire(&service, "개발팀", 15, 0).await;
    let mut blank = submission(&employee.id, date(2024, 10, 8), date(2024, 10, 8), LeaveType::Other);
    blank.reason = "   ".to_string();

    let err = service.submit_leave(blank, at(2024, 10, 1, 9)).await.unwrap_err();

    assert_eq!(err, LeaveError::EmptyReason { field: "reason" });
}

#[tokio::test]
async fn entitlement_beyond_integer_range_is_refused() {
    let (store, service) = service();

    let err = service
        .create_employee(new_employee("개발팀", i32::MAX, 1))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LeaveError::InvalidEntitlement {
            field: "carryOverLeaves"
        }
    );
    assert!(store.list_employees().await.unwrap().is_empty());

    let employee = hire(&service, "개발팀", i32::MAX - 1, 1).await;
    assert_eq!(employee.remaining_leaves, i32::MAX);
}

#[tokio::test]
async fn single_day_request_counts_one_day() {
    let (_, service) = service();
    let employee = hire(&service, "개발팀", 15, 0).await;

    let request = service
        .submit_leave(
            submission(&employee.id, date(2024, 10, 8), date(2024, 10, 8), LeaveType::AnnualLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap();

    assert_eq!(request.days, 1);
}

#[tokio::test]
async fn submission_for_unknown_employee_is_not_found() {
    let (_, service) = service();

    let err = service
        .submit_leave(
            submission("ghost", date(2024, 10, 8), date(2024, 10, 8), LeaveType::SickLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::NotFound { entity: "employee", .. }));
}

#[tokio::test]
async fn second_approval_is_refused_and_debits_once() {
    let (store, service) = service();
    let employee = hire(&service, "개발팀", 15, 0).await;
    let request = service
        .submit_leave(
            submission(&employee.id, date(2024, 10, 8), date(2024, 10, 9), LeaveType::AnnualLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap();

    service
        .decide_leave(&request.id, Decision::Approve, "hr-admin", at(2024, 10, 2, 10))
        .await
        .unwrap();
    let err = service
        .decide_leave(&request.id, Decision::Approve, "hr-admin", at(2024, 10, 2, 11))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LeaveError::AlreadyDecided {
            id: request.id.clone(),
            status: LeaveStatus::Approved
        }
    );
    let after = store.get_employee(&employee.id).await.unwrap().unwrap();
    assert_eq!(after.used_leaves, 2);
    assert_eq!(after.remaining_leaves, 13);
}

#[tokio::test]
async fn rejected_request_cannot_be_approved_later() {
    let (store, service) = service();
    let employee = hire(&service, "개발팀", 15, 0).await;
    let request = service
        .submit_leave(
            submission(&employee.id, date(2024, 10, 8), date(2024, 10, 9), LeaveType::AnnualLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap();

    let rejected = service
        .decide_leave(
            &request.id,
            Decision::Reject {
                reason: "마감 주간".to_string(),
            },
            "team-lead",
            at(2024, 10, 2, 10),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, LeaveStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("마감 주간"));

    let err = service
        .decide_leave(&request.id, Decision::Approve, "hr-admin", at(2024, 10, 3, 10))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LeaveError::AlreadyDecided {
            status: LeaveStatus::Rejected,
            ..
        }
    ));
    let after = store.get_employee(&employee.id).await.unwrap().unwrap();
    assert_eq!(after.used_leaves, 0);
}

#[tokio::test]
async fn rejection_requires_a_reason() {
    let (store, service) = service();
    let employee = hire(&service, "개발팀", 15, 0).await;
    let request = service
        .submit_leave(
            submission(&employee.id, date(2024, 10, 8), date(2024, 10, 9), LeaveType::SickLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap();

    let err = service
        .decide_leave(
            &request.id,
            Decision::Reject {
                reason: " ".to_string(),
            },
            "team-lead",
            at(2024, 10, 2, 10),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::EmptyReason { .. }));
    let stored = store.get_leave(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, LeaveStatus::Requested);
}

#[tokio::test]
async fn non_annual_approval_leaves_balance_untouched() {
    let (store, service) = service();
    let employee = hire(&service, "개발팀", 15, 0).await;

    for leave_type in [LeaveType::SickLeave, LeaveType::Bereavement, LeaveType::Other] {
        let request = service
            .submit_leave(
                submission(&employee.id, date(2024, 10, 1), date(2024, 10, 31), leave_type),
                at(2024, 9, 20, 9),
            )
            .await
            .expect("non-annual leave is not balance checked");
        service
            .decide_leave(&request.id, Decision::Approve, "hr-admin", at(2024, 9, 21, 9))
            .await
            .unwrap();
    }

    let after = store.get_employee(&employee.id).await.unwrap().unwrap();
    assert_eq!(after, employee);
}

#[tokio::test]
async fn deciding_unknown_request_is_not_found() {
    let (_, service) = service();

    let err = service
        .decide_leave("missing", Decision::Approve, "hr-admin", at(2024, 10, 2, 10))
        .await
        .unwrap_err();

    assert_eq!(err, LeaveError::leave_not_found("missing"));
}

#[tokio::test]
async fn approval_rechecks_balance_changed_since_submission() {
    let (store, service) = service();
    let employee = hire(&service, "개발팀", 8, 0).await;
    let first = service
        .submit_leave(
            submission(&employee.id, date(2024, 10, 7), date(2024, 10, 11), LeaveType::AnnualLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap();
    let second = service
        .submit_leave(
            submission(&employee.id, date(2024, 11, 4), date(2024, 11, 8), LeaveType::AnnualLeave),
            at(2024, 10, 1, 10),
        )
        .await
        .unwrap();

    service
        .decide_leave(&first.id, Decision::Approve, "hr-admin", at(2024, 10, 2, 9))
        .await
        .unwrap();
    let err = service
        .decide_leave(&second.id, Decision::Approve, "hr-admin", at(2024, 10, 2, 10))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LeaveError::InsufficientBalance {
            requested: 5,
            remaining: 3
        }
    );
    let stored = store.get_leave(&second.id).await.unwrap().unwrap();
    assert_eq!(stored.status, LeaveStatus::Requested);
    let after = store.get_employee(&employee.id).await.unwrap().unwrap();
    assert_eq!(after.remaining_leaves, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_approvals_for_one_employee_are_serialized() {
    let (store, service) = slow_service();
    let service = Arc::new(service);
    let employee = hire(&service, "개발팀", 8, 0).await;

    let mut ids = Vec::new();
    for (start, end) in [(date(2024, 10, 7), date(2024, 10, 11)), (date(2024, 11, 4), date(2024, 11, 8))] {
        let request = service
            .submit_leave(submission(&employee.id, start, end, LeaveType::AnnualLeave), at(2024, 10, 1, 9))
            .await
            .unwrap();
        ids.push(request.id);
    }

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .decide_leave(&id, Decision::Approve, "hr-admin", at(2024, 10, 2, 9))
                    .await
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let approved = outcomes.iter().filter(|o| o.is_ok()).count();
    assert_eq!(approved, 1);
    let refused = outcomes.iter().find_map(|o| o.as_ref().err()).unwrap();
    assert!(matches!(
        refused,
        LeaveError::InsufficientBalance { .. } | LeaveError::Conflict { .. }
    ));

    let after = store.get_employee(&employee.id).await.unwrap().unwrap();
    assert_eq!(after.used_leaves, 5);
    assert_eq!(after.remaining_leaves, 3);
}

#[tokio::test]
async fn stale_balance_write_is_a_conflict() {
    let (store, service) = service();
    let employee = hire(&service, "개발팀", 8, 0).await;
    let stale = employee.balance();

    let mut first = employee.clone();
    first.used_leaves = 5;
    first.remaining_leaves = 3;
    store.save_balance(&first, stale).await.unwrap();

    let mut second = employee.clone();
    second.used_leaves = 5;
    second.remaining_leaves = 3;
    let err = store.save_balance(&second, stale).await.unwrap_err();

    assert_eq!(err, StoreError::Conflict);
    assert!(
        LeaveError::Conflict {
            employee_id: employee.id.clone()
        }
        .is_retryable()
    );
}

#[tokio::test]
async fn approvals_from_two_service_instances_debit_once() {
    let (store, first) = slow_service();
    let second = LeaveService::new(store.clone());
    let employee = hire(&first, "개발팀", 8, 0).await;

    let mut ids = Vec::new();
    for (start, end) in [(date(2024, 10, 7), date(2024, 10, 11)), (date(2024, 11, 4), date(2024, 11, 8))] {
        let request = first
            .submit_leave(submission(&employee.id, start, end, LeaveType::AnnualLeave), at(2024, 10, 1, 9))
            .await
            .unwrap();
        ids.push(request.id);
    }

    let (a, b) = tokio::join!(
        first.decide_leave(&ids[0], Decision::Approve, "hr-admin", at(2024, 10, 2, 9)),
        second.decide_leave(&ids[1], Decision::Approve, "hr-lead", at(2024, 10, 2, 9)),
    );

    let outcomes = [a, b];
    let approved: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].status, LeaveStatus::Approved);
    let refused = outcomes.iter().find_map(|o| o.as_ref().err()).unwrap();
    assert_eq!(
        refused,
        &LeaveError::Conflict {
            employee_id: employee.id.clone()
        }
    );

    let after = store.get_employee(&employee.id).await.unwrap().unwrap();
    assert_eq!(after.used_leaves, 5);
    assert_eq!(after.remaining_leaves, 3);

    let pending = store
        .list_leaves(&LeaveFilter {
            status: Some(LeaveStatus::Requested),
            ..LeaveFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
}

/// Delegates to a memory store but fails every decision write.
struct FailingDecisions {
    inner: MemoryStore,
}

#[async_trait]
impl RecordStore for FailingDecisions {
    async fn get_employee(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        self.inner.get_employee(id).await
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.inner.list_employees().await
    }

    async fn create_employee(&self, new: NewEmployee) -> Result<Employee, StoreError> {
        self.inner.create_employee(new).await
    }

    async fn save_balance(&self, employee: &Employee, expected: Balance) -> Result<(), StoreError> {
        self.inner.save_balance(employee, expected).await
    }

    async fn get_leave(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
        self.inner.get_leave(id).await
    }

    async fn list_leaves(&self, filter: &LeaveFilter) -> Result<Vec<LeaveRequest>, StoreError> {
        self.inner.list_leaves(filter).await
    }

    async fn count_leaves(&self, filter: &LeaveFilter) -> Result<u64, StoreError> {
        self.inner.count_leaves(filter).await
    }

    async fn create_leave(&self, new: NewLeave) -> Result<LeaveRequest, StoreError> {
        self.inner.create_leave(new).await
    }

    async fn record_decision(&self, _request: &LeaveRequest) -> Result<(), StoreError> {
        Err(StoreError::Backend("leaves collection offline".to_string()))
    }
}

#[tokio::test]
async fn failed_decision_write_restores_the_balance() {
    let store = Arc::new(FailingDecisions {
        inner: MemoryStore::new(),
    });
    let service = LeaveService::new(store.clone());
    let employee = hire(&service, "개발팀", 15, 0).await;
    let request = service
        .submit_leave(
            submission(&employee.id, date(2024, 10, 8), date(2024, 10, 10), LeaveType::AnnualLeave),
            at(2024, 10, 1, 9),
        )
        .await
        .unwrap();

    let err = service
        .decide_leave(&request.id, Decision::Approve, "hr-admin", at(2024, 10, 2, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::PersistenceFailure { .. }));
    assert!(err.is_retryable());
    let after = store.get_employee(&employee.id).await.unwrap().unwrap();
    assert_eq!(after, employee);
    let stored = store.get_leave(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, LeaveStatus::Requested);
}
