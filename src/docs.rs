use crate::api::leave_balance::{BalanceResponse, SetBalance};
use crate::api::leave_request::{CreateLeave, EditLeave};
use crate::leave::LeaveDocumentView;
use crate::model::balance::LeaveBalanceConfig;
use crate::model::leave_request::{LeaveRequest, LeaveState};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave API",
        version = "1.0.0",
        description = r#"
## Leave Balance & Request Lifecycle

Tracks each employee's yearly leave allotment and the requests drawn against it.

### 🔹 Key Features
- **Balances**
  - HR/Admin set an employee's allotment and the approver shown on leave documents
  - Remaining days are always derived from pending and approved requests
- **Requests**
  - Submit, edit while pending, approve, and cancel leave
  - A request is refused outright if it would overdraw the balance
- **Documents**
  - Fetch the fields needed to render a leave certificate

### 🔐 Security
All endpoints require a **JWT Bearer** access token.
Employees act on their own leave; **Admin** and **HR** act on anyone's.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_balance::get_balance,
        crate::api::leave_balance::set_balance,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::edit_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::list_employee_leave,
        crate::api::leave_request::leave_document
    ),
    components(
        schemas(
            SetBalance,
            BalanceResponse,
            LeaveBalanceConfig,
            CreateLeave,
            EditLeave,
            LeaveRequest,
            LeaveState,
            LeaveDocumentView
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request APIs"),
        (name = "Leave balance", description = "Leave allotment APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
