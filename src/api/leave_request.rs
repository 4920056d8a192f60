use crate::auth::actor::Actor;
use crate::collab::audit::{AuditLog, record_best_effort};
use crate::leave::LeaveEngine;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

const AUDIT_MODULE: &str = "leave";

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    /// Employee the leave is for; defaults to the caller's own employee record
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-14", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct EditLeave {
    #[schema(example = "2024-01-11", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

/* =========================
Create leave request
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Not configured or insufficient balance", body = Object, example = json!({
            "error": "InsufficientBalance",
            "message": "requested 10 days but only 9 remain"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    actor: Actor,
    engine: web::Data<LeaveEngine>,
    audit: web::Data<dyn AuditLog>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match payload.employee_id.or(actor.employee_id) {
        Some(id) => id,
        None => return Err(actix_web::error::ErrorForbidden("No employee profile")),
    };

    let request = engine
        .create(&actor, employee_id, payload.start_date, payload.end_date)
        .await?;

    record_best_effort(
        audit.get_ref(),
        &actor,
        &format!("create leave request #{}", request.id),
        AUDIT_MODULE,
    )
    .await;

    Ok(HttpResponse::Created().json(request))
}

/* =========================
Edit pending leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to edit")
    ),
    request_body = EditLeave,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequest),
        (status = 400, description = "Invalid date range"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Not pending or insufficient balance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn edit_leave(
    actor: Actor,
    engine: web::Data<LeaveEngine>,
    audit: web::Data<dyn AuditLog>,
    path: web::Path<u64>,
    payload: web::Json<EditLeave>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let request = engine
        .edit(&actor, leave_id, payload.start_date, payload.end_date)
        .await?;

    record_best_effort(
        audit.get_ref(),
        &actor,
        &format!("edit leave request #{}", leave_id),
        AUDIT_MODULE,
    )
    .await;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Approve leave (HR/Admin)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already approved or cancelled", body = Object, example = json!({
            "error": "AlreadyApproved",
            "message": "leave request 1 is already approved"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    actor: Actor,
    engine: web::Data<LeaveEngine>,
    audit: web::Data<dyn AuditLog>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let request = engine.approve(&actor, leave_id).await?;

    record_best_effort(
        audit.get_ref(),
        &actor,
        &format!("approve leave request #{}", leave_id),
        AUDIT_MODULE,
    )
    .await;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Cancel leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave cancelled; its days are back in the balance", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already cancelled")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    actor: Actor,
    engine: web::Data<LeaveEngine>,
    audit: web::Data<dyn AuditLog>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let request = engine.cancel(&actor, leave_id).await?;

    record_best_effort(
        audit.get_ref(),
        &actor,
        &format!("cancel leave request #{}", leave_id),
        AUDIT_MODULE,
    )
    .await;

    Ok(HttpResponse::Ok().json(request))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "NotFound",
            "message": "leave request 1 not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    actor: Actor,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = engine.get(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// Leave history of one employee, oldest start date first
#[utoipa::path(
    get,
    path = "/api/leave/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose leave to list")
    ),
    responses(
        (status = 200, description = "Leave requests of the employee", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn list_employee_leave(
    actor: Actor,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let requests = engine.list_by_employee(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Data for rendering a leave document
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}/document",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request")
    ),
    responses(
        (status = 200, description = "Document fields", body = LeaveDocumentView),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_document(
    actor: Actor,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let view = engine.document_view(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}
