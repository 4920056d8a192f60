use std::sync::Arc;

use crate::error::StoreResult;
use crate::model::balance::LeaveBalanceConfig;
use crate::store::{LeaveStore, LeaveTx};

/// Allotment minus days held by live requests. No config means nothing left.
pub fn remaining_days(config: Option<&LeaveBalanceConfig>, held_days: i64) -> i64 {
    match config {
        Some(config) => i64::from(config.total_days_granted) - held_days,
        None => 0,
    }
}

/// Derives remaining balance from the ledger; nothing is ever cached.
#[derive(Clone)]
pub struct BalanceCalculator {
    store: Arc<dyn LeaveStore>,
}

impl BalanceCalculator {
    pub fn new(store: Arc<dyn LeaveStore>) -> Self {
        Self { store }
    }

    /// Unsynchronized read, good for display only.
    pub async fn remaining(
        &self,
        employee_id: u64,
        exclude_request_id: Option<u64>,
    ) -> StoreResult<i64> {
        let config = self.store.config(employee_id).await?;
        if config.is_none() {
            return Ok(0);
        }
        let held = self.store.held_days(employee_id, exclude_request_id).await?;
        Ok(remaining_days(config.as_ref(), held))
    }

    /// Balance as seen inside a transaction that already holds `config`'s lock.
    pub async fn remaining_within(
        tx: &mut dyn LeaveTx,
        config: &LeaveBalanceConfig,
        exclude_request_id: Option<u64>,
    ) -> StoreResult<i64> {
        let held = tx.held_days(config.employee_id, exclude_request_id).await?;
        Ok(remaining_days(Some(config), held))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::NewLeaveRequest;
    use crate::store::MemoryLeaveStore;
    use chrono::NaiveDate;

    fn config(total: u32) -> LeaveBalanceConfig {
        LeaveBalanceConfig {
            employee_id: 1,
            total_days_granted: total,
            approver_display_name: "HR".into(),
        }
    }

    #[test]
    fn remaining_is_grant_minus_held() {
        assert_eq!(remaining_days(Some(&config(14)), 5), 9);
        assert_eq!(remaining_days(Some(&config(14)), 0), 14);
        assert_eq!(remaining_days(None, 0), 0);
        assert_eq!(remaining_days(None, 3), 0);
    }

    #[actix_web::test]
    async fn excluded_request_is_left_out_of_the_sum() {
        let store = MemoryLeaveStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.upsert_config(config(14)).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let first = tx
            .insert_request(NewLeaveRequest {
                employee_id: 1,
                start_date: day,
                end_date: day,
                requested_days: 5,
                remaining_after_snapshot: 9,
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let calculator = BalanceCalculator::new(Arc::new(store.clone()));
        assert_eq!(calculator.remaining(1, None).await.unwrap(), 9);
        assert_eq!(calculator.remaining(1, Some(first.id)).await.unwrap(), 14);
        assert_eq!(calculator.remaining(2, None).await.unwrap(), 0);

        let mut tx = store.begin().await.unwrap();
        let held_elsewhere = BalanceCalculator::remaining_within(&mut *tx, &config(14), None)
            .await
            .unwrap();
        assert_eq!(held_elsewhere, 9);
    }
}
