use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::{this_year, today};
use crate::leave::{BalanceAudit, CurrentLeaveStatus, LeaveError, LeaveService};
use crate::model::{Employee, NewEmployee};

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AsOfQuery {
    /// Calendar date to evaluate (YYYY-MM-DD), defaults to today
    #[param(value_type = Option<String>, example = "2024-10-09")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct YearQuery {
    /// Calendar year, defaults to the current year
    #[param(example = 2024)]
    pub year: Option<i32>,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Entitlement out of range")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    service: web::Data<LeaveService>,
    payload: web::Json<NewEmployee>,
) -> Result<HttpResponse, LeaveError> {
    let employee = service.create_employee(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employee",
    responses(
        (status = 200, description = "All employees", body = Vec<Employee>)
    ),
    tag = "Employee"
)]
pub async fn list_employees(service: web::Data<LeaveService>) -> Result<HttpResponse, LeaveError> {
    let employees = service.list_employees().await?;
    Ok(HttpResponse::Ok().json(employees))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    let employee = service.get_employee(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Whether the employee is on approved leave on the given date
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}/leave-status",
    params(
        ("employee_id" = String, Path, description = "Employee ID"),
        AsOfQuery
    ),
    responses(
        (status = 200, description = "Current leave status", body = CurrentLeaveStatus),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn current_leave_status(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
    query: web::Query<AsOfQuery>,
) -> Result<HttpResponse, LeaveError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let status = service.current_leave_status(&path.into_inner(), as_of).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Approved annual-leave days recomputed from history
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}/annual-days",
    params(
        ("employee_id" = String, Path, description = "Employee ID"),
        YearQuery
    ),
    responses(
        (status = 200, description = "Year-to-date annual leave days", body = Object, example = json!({
            "employeeId": "6f1c2a4e-5d0b-4a8e-9a51-0c8f4f0d2e11",
            "year": 2024,
            "days": 3
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn annual_days(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
    query: web::Query<YearQuery>,
) -> Result<HttpResponse, LeaveError> {
    let employee_id = path.into_inner();
    let year = query.year.unwrap_or_else(this_year);

    service.get_employee(&employee_id).await?;
    let days = service.year_to_date_annual_days(&employee_id, year).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "employeeId": employee_id,
        "year": year,
        "days": days
    })))
}

/// Cached balance checked against approval history
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}/balance-audit",
    params(
        ("employee_id" = String, Path, description = "Employee ID"),
        YearQuery
    ),
    responses(
        (status = 200, description = "Balance audit", body = BalanceAudit),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn balance_audit(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
    query: web::Query<YearQuery>,
) -> Result<HttpResponse, LeaveError> {
    let year = query.year.unwrap_or_else(this_year);
    let audit = service.balance_audit(&path.into_inner(), year).await?;
    Ok(HttpResponse::Ok().json(audit))
}
