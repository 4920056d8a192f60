use crate::auth::actor::Actor;
use crate::collab::audit::{AuditLog, record_best_effort};
use crate::leave::LeaveEngine;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct SetBalance {
    #[schema(example = 14, minimum = 0, maximum = 365)]
    pub total_days_granted: i64,
    #[schema(example = "Jane Smith, Head of HR")]
    pub approver_display_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 1000)]
    pub employee_id: u64,
    /// false until an administrator sets an allotment
    #[schema(example = true)]
    pub configured: bool,
    #[schema(example = 14, nullable = true)]
    pub total_days_granted: Option<u32>,
    #[schema(example = "Jane Smith, Head of HR", nullable = true)]
    pub approver_display_name: Option<String>,
    #[schema(example = 9)]
    pub remaining: i64,
}

/// Allotment and remaining days of an employee
#[utoipa::path(
    get,
    path = "/api/leave/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee to look up")
    ),
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave balance"
)]
pub async fn get_balance(
    actor: Actor,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let config = engine.get_config(&actor, employee_id).await?;
    let remaining = engine.remaining(&actor, employee_id).await?;

    Ok(HttpResponse::Ok().json(BalanceResponse {
        employee_id,
        configured: config.is_some(),
        total_days_granted: config.as_ref().map(|c| c.total_days_granted),
        approver_display_name: config.map(|c| c.approver_display_name),
        remaining,
    }))
}

/// Set an employee's allotment (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/leave/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee to configure")
    ),
    request_body = SetBalance,
    responses(
        (status = 200, description = "Balance configured", body = LeaveBalanceConfig),
        (status = 400, description = "Invalid allotment, blank approver or unknown employee", body = Object, example = json!({
            "error": "ValidationError",
            "message": "total_days_granted must be between 0 and 365"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave balance"
)]
pub async fn set_balance(
    actor: Actor,
    engine: web::Data<LeaveEngine>,
    audit: web::Data<dyn AuditLog>,
    path: web::Path<u64>,
    payload: web::Json<SetBalance>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let config = engine
        .set_config(
            &actor,
            employee_id,
            payload.total_days_granted,
            &payload.approver_display_name,
        )
        .await?;

    record_best_effort(
        audit.get_ref(),
        &actor,
        &format!("set leave balance of employee {}", employee_id),
        "leave_balance",
    )
    .await;

    Ok(HttpResponse::Ok().json(config))
}
