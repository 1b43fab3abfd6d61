use actix_web::{HttpResponse, web};

use crate::api::employee::AsOfQuery;
use crate::api::today;
use crate::leave::{DepartmentSummary, LeaveError, LeaveService, ResetSummary};

#[utoipa::path(
    get,
    path = "/api/department/summary",
    params(AsOfQuery),
    responses(
        (status = 200, description = "Head-count per department", body = Vec<DepartmentSummary>)
    ),
    tag = "Department"
)]
pub async fn department_summary(
    service: web::Data<LeaveService>,
    query: web::Query<AsOfQuery>,
) -> Result<HttpResponse, LeaveError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let summary = service.department_summary(as_of).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Period boundary reset of consumed leave for every employee
#[utoipa::path(
    post,
    path = "/api/balance/reset",
    params(AsOfQuery),
    responses(
        (status = 200, description = "Reset finished; failures are listed per employee", body = ResetSummary),
        (status = 503, description = "Employees could not be listed")
    ),
    tag = "Balance"
)]
pub async fn reset_all_balances(
    service: web::Data<LeaveService>,
    query: web::Query<AsOfQuery>,
) -> Result<HttpResponse, LeaveError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let summary = service.reset_all_balances(as_of).await?;
    Ok(HttpResponse::Ok().json(summary))
}
