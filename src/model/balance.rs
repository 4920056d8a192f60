use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upper bound for a configured annual allotment.
pub const MAX_DAYS_GRANTED: u32 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveBalanceConfig {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 14)]
    pub total_days_granted: u32,
    /// Printed on generated leave documents.
    #[schema(example = "Jane Smith, Head of HR")]
    pub approver_display_name: String,
}
