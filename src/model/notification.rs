use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use uuid::Uuid;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NotificationKind {
    Approved,
    CancelledByAdmin,
    CancelledWithRefund,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub event_id: Uuid,
    pub recipient_employee_id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub related_request_id: u64,
}

impl NotificationEvent {
    pub fn new(
        recipient_employee_id: u64,
        kind: NotificationKind,
        message: String,
        related_request_id: u64,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            recipient_employee_id,
            kind,
            message,
            related_request_id,
        }
    }
}
