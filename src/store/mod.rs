//! Persistence seam for balance configs and leave requests.
//!
//! Reads on [`LeaveStore`] are unsynchronized and meant for display. Anything
//! that decides a mutation goes through a [`LeaveTx`], which must give
//! serializable behaviour per employee: once `lock_config` or `upsert_config`
//! returns, no other transaction can change that employee's config or requests
//! until this one commits or is dropped. Dropping a transaction without `commit` rolls it back.

use futures::future::BoxFuture;

use crate::error::StoreResult;
use crate::model::balance::LeaveBalanceConfig;
use crate::model::leave_request::{LeaveRequest, NewLeaveRequest};

pub mod memory;
pub mod mysql;

pub use memory::MemoryLeaveStore;
pub use mysql::MySqlLeaveStore;

pub trait LeaveStore: Send + Sync {
    fn begin(&self) -> BoxFuture<'_, StoreResult<Box<dyn LeaveTx>>>;

    fn config(&self, employee_id: u64) -> BoxFuture<'_, StoreResult<Option<LeaveBalanceConfig>>>;

    fn request(&self, request_id: u64) -> BoxFuture<'_, StoreResult<Option<LeaveRequest>>>;

    /// All requests of one employee, oldest start date first.
    fn requests_by_employee(&self, employee_id: u64)
    -> BoxFuture<'_, StoreResult<Vec<LeaveRequest>>>;

    /// Days held by live requests, optionally leaving one request out.
    fn held_days(
        &self,
        employee_id: u64,
        exclude_request_id: Option<u64>,
    ) -> BoxFuture<'_, StoreResult<i64>>;
}

pub trait LeaveTx: Send {
    /// Reads the config and takes the per-employee lock.
    fn lock_config(
        &mut self,
        employee_id: u64,
    ) -> BoxFuture<'_, StoreResult<Option<LeaveBalanceConfig>>>;

    fn upsert_config(&mut self, config: LeaveBalanceConfig) -> BoxFuture<'_, StoreResult<()>>;

    fn lock_request(&mut self, request_id: u64) -> BoxFuture<'_, StoreResult<Option<LeaveRequest>>>;

    fn held_days(
        &mut self,
        employee_id: u64,
        exclude_request_id: Option<u64>,
    ) -> BoxFuture<'_, StoreResult<i64>>;

    fn insert_request(&mut self, request: NewLeaveRequest) -> BoxFuture<'_, StoreResult<LeaveRequest>>;

    /// Overwrites dates, day count, snapshot and state of an existing row and
    /// returns the row as stored, with the backend's `updated_at`.
    fn update_request(&mut self, request: LeaveRequest) -> BoxFuture<'_, StoreResult<LeaveRequest>>;

    fn commit(self: Box<Self>) -> BoxFuture<'static, StoreResult<()>>;
}
