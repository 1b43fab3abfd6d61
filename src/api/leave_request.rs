use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::leave::{LeaveError, LeavePage, LeaveService, LeaveSubmission};
use crate::model::{Decision, LeaveRequest, LeaveStatus};

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaveQuery {
    /// Filter by employee ID
    pub employee_id: Option<String>,
    /// Filter by leave status (신청, 승인, 반려)
    #[param(value_type = Option<String>, example = "신청")]
    pub status: Option<LeaveStatus>,
    /// Pagination page number (start with 1)
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Items per page, at most 100
    #[param(example = 10)]
    pub per_page: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveLeave {
    #[schema(example = "hr-admin")]
    pub decider_id: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectLeave {
    #[schema(example = "hr-admin")]
    pub decider_id: String,
    #[schema(example = "프로젝트 마감 기간")]
    pub reason: String,
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeaveSubmission,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid range or blank reason"),
        (status = 404, description = "Employee not found"),
        (status = 422, description = "Not enough annual leave remaining")
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    service: web::Data<LeaveService>,
    payload: web::Json<LeaveSubmission>,
) -> Result<HttpResponse, LeaveError> {
    let request = service.submit_leave(payload.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Created().json(request))
}

/* =========================
Approve leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to approve")
    ),
    request_body = ApproveLeave,
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 404, description = "Leave request or employee not found"),
        (status = 409, description = "Already decided, or balance changed concurrently"),
        (status = 422, description = "Not enough annual leave remaining")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
    payload: web::Json<ApproveLeave>,
) -> Result<HttpResponse, LeaveError> {
    let leave_id = path.into_inner();
    let decided = service
        .decide_leave(&leave_id, Decision::Approve, &payload.decider_id, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(decided))
}

/* =========================
Reject leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to reject")
    ),
    request_body = RejectLeave,
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 400, description = "Blank rejection reason"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already decided")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
    payload: web::Json<RejectLeave>,
) -> Result<HttpResponse, LeaveError> {
    let leave_id = path.into_inner();
    let RejectLeave { decider_id, reason } = payload.into_inner();
    let decided = service
        .decide_leave(&leave_id, Decision::Reject { reason }, &decider_id, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(decided))
}

#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    let leave = service.get_leave(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeavePage)
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    service: web::Data<LeaveService>,
    query: web::Query<LeaveQuery>,
) -> Result<HttpResponse, LeaveError> {
    let LeaveQuery {
        employee_id,
        status,
        page,
        per_page,
    } = query.into_inner();

    let page = service.list_leaves(employee_id, status, page, per_page).await?;
    Ok(HttpResponse::Ok().json(page))
}
