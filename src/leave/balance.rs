use std::sync::Arc;

use tracing::{info, instrument};

use crate::auth::actor::Actor;
use crate::auth::gate::{AuthorizationGate, Operation};
use crate::collab::roster::EmployeeRoster;
use crate::error::LeaveError;
use crate::model::balance::{LeaveBalanceConfig, MAX_DAYS_GRANTED};
use crate::store::LeaveStore;

/// Per-employee allotments. Configs are upserted, never deleted.
#[derive(Clone)]
pub struct BalanceStore {
    store: Arc<dyn LeaveStore>,
    roster: Arc<dyn EmployeeRoster>,
    gate: AuthorizationGate,
}

impl BalanceStore {
    pub fn new(store: Arc<dyn LeaveStore>, roster: Arc<dyn EmployeeRoster>) -> Self {
        Self {
            store,
            roster,
            gate: AuthorizationGate,
        }
    }

    pub async fn get(
        &self,
        actor: &Actor,
        employee_id: u64,
    ) -> Result<Option<LeaveBalanceConfig>, LeaveError> {
        self.gate.check(actor, Operation::ViewLeave, employee_id)?;
        Ok(self.store.config(employee_id).await?)
    }

    /// Creates or overwrites the employee's allotment. A grant lower than the
    /// days already held by pending and approved requests is refused.
    #[instrument(skip(self, actor, approver_display_name), fields(user_id = actor.user_id))]
    pub async fn set(
        &self,
        actor: &Actor,
        employee_id: u64,
        total_days_granted: i64,
        approver_display_name: &str,
    ) -> Result<LeaveBalanceConfig, LeaveError> {
        self.gate.check(actor, Operation::SetConfig, employee_id)?;

        let total_days_granted = u32::try_from(total_days_granted)
            .ok()
            .filter(|days| *days <= MAX_DAYS_GRANTED)
            .ok_or_else(|| {
                LeaveError::validation(format!(
                    "total_days_granted must be between 0 and {}",
                    MAX_DAYS_GRANTED
                ))
            })?;

        let approver_display_name = approver_display_name.trim();
        if approver_display_name.is_empty() {
            return Err(LeaveError::validation("approver_display_name must not be blank"));
        }

        if !self.roster.employee_exists(employee_id).await? {
            return Err(LeaveError::validation(format!(
                "employee {} does not exist",
                employee_id
            )));
        }

        let config = LeaveBalanceConfig {
            employee_id,
            total_days_granted,
            approver_display_name: approver_display_name.to_string(),
        };

        // The upsert takes the config row lock even on first configuration;
        // a refused grant is rolled back when `tx` drops.
        let mut tx = self.store.begin().await?;
        tx.upsert_config(config.clone()).await?;
        let held = tx.held_days(employee_id, None).await?;
        if held > i64::from(total_days_granted) {
            return Err(LeaveError::validation(format!(
                "cannot grant {} days: {} days are already held by pending or approved requests",
                total_days_granted, held
            )));
        }
        tx.commit().await?;

        info!(employee_id, total_days_granted, "Leave balance configured");
        Ok(config)
    }
}
