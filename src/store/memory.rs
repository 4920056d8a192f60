use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LeaveStore, LeaveTx};
use crate::error::{StoreError, StoreResult};
use crate::model::balance::LeaveBalanceConfig;
use crate::model::leave_request::{LeaveRequest, LeaveState, NewLeaveRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryState {
    pub configs: BTreeMap<u64, LeaveBalanceConfig>,
    pub requests: BTreeMap<u64, LeaveRequest>,
    pub last_request_id: u64,
}

impl MemoryState {
    fn held_days(&self, employee_id: u64, exclude_request_id: Option<u64>) -> i64 {
        self.requests
            .values()
            .filter(|r| r.employee_id == employee_id)
            .filter(|r| r.state.is_live())
            .filter(|r| Some(r.id) != exclude_request_id)
            .map(|r| i64::from(r.requested_days))
            .sum()
    }
}

/// Single-process backend. A transaction holds the whole store for its
/// lifetime and works on a copy that replaces the shared state on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaveStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLeaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything currently committed.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

impl LeaveStore for MemoryLeaveStore {
    fn begin(&self) -> BoxFuture<'_, StoreResult<Box<dyn LeaveTx>>> {
        async move {
            let guard = self.state.clone().lock_owned().await;
            let working = guard.clone();
            Ok(Box::new(MemoryTx { guard, working }) as Box<dyn LeaveTx>)
        }
        .boxed()
    }

    fn config(&self, employee_id: u64) -> BoxFuture<'_, StoreResult<Option<LeaveBalanceConfig>>> {
        async move { Ok(self.state.lock().await.configs.get(&employee_id).cloned()) }.boxed()
    }

    fn request(&self, request_id: u64) -> BoxFuture<'_, StoreResult<Option<LeaveRequest>>> {
        async move { Ok(self.state.lock().await.requests.get(&request_id).cloned()) }.boxed()
    }

    fn requests_by_employee(
        &self,
        employee_id: u64,
    ) -> BoxFuture<'_, StoreResult<Vec<LeaveRequest>>> {
        async move {
            let state = self.state.lock().await;
            let mut requests: Vec<LeaveRequest> = state
                .requests
                .values()
                .filter(|r| r.employee_id == employee_id)
                .cloned()
                .collect();
            requests.sort_by_key(|r| (r.start_date, r.id));
            Ok(requests)
        }
        .boxed()
    }

    fn held_days(
        &self,
        employee_id: u64,
        exclude_request_id: Option<u64>,
    ) -> BoxFuture<'_, StoreResult<i64>> {
        async move {
            Ok(self
                .state
                .lock()
                .await
                .held_days(employee_id, exclude_request_id))
        }
        .boxed()
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

impl LeaveTx for MemoryTx {
    fn lock_config(
        &mut self,
        employee_id: u64,
    ) -> BoxFuture<'_, StoreResult<Option<LeaveBalanceConfig>>> {
        let config = self.working.configs.get(&employee_id).cloned();
        async move { Ok(config) }.boxed()
    }

    fn upsert_config(&mut self, config: LeaveBalanceConfig) -> BoxFuture<'_, StoreResult<()>> {
        self.working.configs.insert(config.employee_id, config);
        async { Ok(()) }.boxed()
    }

    fn lock_request(&mut self, request_id: u64) -> BoxFuture<'_, StoreResult<Option<LeaveRequest>>> {
        let request = self.working.requests.get(&request_id).cloned();
        async move { Ok(request) }.boxed()
    }

    fn held_days(
        &mut self,
        employee_id: u64,
        exclude_request_id: Option<u64>,
    ) -> BoxFuture<'_, StoreResult<i64>> {
        let held = self.working.held_days(employee_id, exclude_request_id);
        async move { Ok(held) }.boxed()
    }

    fn insert_request(&mut self, request: NewLeaveRequest) -> BoxFuture<'_, StoreResult<LeaveRequest>> {
        self.working.last_request_id += 1;
        let now = Utc::now();
        let stored = LeaveRequest {
            id: self.working.last_request_id,
            employee_id: request.employee_id,
            start_date: request.start_date,
            end_date: request.end_date,
            requested_days: request.requested_days,
            remaining_after_snapshot: request.remaining_after_snapshot,
            state: LeaveState::Pending,
            created_at: now,
            updated_at: now,
        };
        self.working.requests.insert(stored.id, stored.clone());
        async move { Ok(stored) }.boxed()
    }

    fn update_request(&mut self, request: LeaveRequest) -> BoxFuture<'_, StoreResult<LeaveRequest>> {
        let result = match self.working.requests.get_mut(&request.id) {
            Some(row) => {
                row.start_date = request.start_date;
                row.end_date = request.end_date;
                row.requested_days = request.requested_days;
                row.remaining_after_snapshot = request.remaining_after_snapshot;
                row.state = request.state;
                row.updated_at = Utc::now();
                Ok(row.clone())
            }
            None => Err(StoreError::Corrupt(format!(
                "leave request {} vanished inside its transaction",
                request.id
            ))),
        };
        async move { result }.boxed()
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StoreResult<()>> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        async { Ok(()) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_request(employee_id: u64, days: u32) -> NewLeaveRequest {
        NewLeaveRequest {
            employee_id,
            start_date: date("2024-03-01"),
            end_date: date("2024-03-01"),
            requested_days: days,
            remaining_after_snapshot: 0,
        }
    }

    #[actix_web::test]
    async fn dropped_transaction_leaves_state_untouched() {
        let store = MemoryLeaveStore::new();
        let before = store.snapshot().await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_request(new_request(1, 3)).await.unwrap();
        drop(tx);

        assert_eq!(store.snapshot().await, before);
    }

    #[actix_web::test]
    async fn committed_ids_are_monotonic() {
        let store = MemoryLeaveStore::new();
        for expected in 1..=3 {
            let mut tx = store.begin().await.unwrap();
            let stored = tx.insert_request(new_request(1, 1)).await.unwrap();
            tx.commit().await.unwrap();
            assert_eq!(stored.id, expected);
        }
        assert_eq!(store.held_days(1, None).await.unwrap(), 3);
        assert_eq!(store.held_days(1, Some(2)).await.unwrap(), 2);
        assert_eq!(store.held_days(2, None).await.unwrap(), 0);
    }
}
