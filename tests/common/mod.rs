#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use hrm_leave::leave::{LeaveService, LeaveSubmission};
use hrm_leave::model::{Employee, LeaveType, NewEmployee};
use hrm_leave::store::MemoryStore;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn service() -> (Arc<MemoryStore>, LeaveService) {
    let store = Arc::new(MemoryStore::new());
    let service = LeaveService::new(store.clone());
    (store, service)
}

/// Store that sleeps on every call so concurrent decisions interleave.
pub fn slow_service() -> (Arc<MemoryStore>, LeaveService) {
    let store = Arc::new(MemoryStore::new().with_latency(Duration::from_millis(5)));
    let service = LeaveService::new(store.clone());
    (store, service)
}

pub fn new_employee(department: &str, total: i32, carry_over: i32) -> NewEmployee {
    NewEmployee {
        name: "김민수".to_string(),
        department: department.to_string(),
        position: "선임".to_string(),
        join_date: date(2021, 3, 2),
        total_leaves: total,
        carry_over_leaves: carry_over,
    }
}

pub async fn hire(service: &LeaveService, department: &str, total: i32, carry_over: i32) -> Employee {
    service
        .create_employee(new_employee(department, total, carry_over))
        .await
        .expect("employee created")
}

pub fn submission(
    employee_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    leave_type: LeaveType,
) -> LeaveSubmission {
    LeaveSubmission {
        employee_id: employee_id.to_string(),
        start_date: start,
        end_date: end,
        leave_type,
        reason: "개인 사유".to_string(),
    }
}
