//! Leave balance and request lifecycle engine.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::auth::actor::Actor;
use crate::auth::gate::{AuthorizationGate, Operation};
use crate::collab::notification_sink::NotificationSink;
use crate::collab::roster::EmployeeRoster;
use crate::error::LeaveError;
use crate::model::balance::LeaveBalanceConfig;
use crate::model::leave_request::LeaveRequest;
use crate::store::LeaveStore;

pub mod balance;
pub mod calculator;
pub mod days;
pub mod ledger;
pub mod notifier;


pub use balance::BalanceStore;
pub use calculator::BalanceCalculator;
pub use ledger::{LeaveDocumentView, RequestLedger};
pub use notifier::NotificationEmitter;

/// Public surface used by the HTTP host.
#[derive(Clone)]
pub struct LeaveEngine {
    balances: BalanceStore,
    calculator: BalanceCalculator,
    ledger: RequestLedger,
    gate: AuthorizationGate,
}

impl LeaveEngine {
    pub fn new(
        store: Arc<dyn LeaveStore>,
        roster: Arc<dyn EmployeeRoster>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            balances: BalanceStore::new(store.clone(), roster),
            calculator: BalanceCalculator::new(store.clone()),
            ledger: RequestLedger::new(store, NotificationEmitter::new(sink)),
            gate: AuthorizationGate,
        }
    }

    pub async fn get_config(
        &self,
        actor: &Actor,
        employee_id: u64,
    ) -> Result<Option<LeaveBalanceConfig>, LeaveError> {
        self.balances.get(actor, employee_id).await
    }

    pub async fn set_config(
        &self,
        actor: &Actor,
        employee_id: u64,
        total_days_granted: i64,
        approver_display_name: &str,
    ) -> Result<LeaveBalanceConfig, LeaveError> {
        self.balances
            .set(actor, employee_id, total_days_granted, approver_display_name)
            .await
    }

    pub async fn remaining(&self, actor: &Actor, employee_id: u64) -> Result<i64, LeaveError> {
        self.gate.check(actor, Operation::ViewLeave, employee_id)?;
        Ok(self.calculator.remaining(employee_id, None).await?)
    }

    pub async fn create(
        &self,
        actor: &Actor,
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<LeaveRequest, LeaveError> {
        self.ledger
            .create(actor, employee_id, start_date, end_date)
            .await
    }

    pub async fn edit(
        &self,
        actor: &Actor,
        request_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<LeaveRequest, LeaveError> {
        self.ledger
            .edit(actor, request_id, start_date, end_date)
            .await
    }

    pub async fn approve(&self, actor: &Actor, request_id: u64) -> Result<LeaveRequest, LeaveError> {
        self.ledger.approve(actor, request_id).await
    }

    pub async fn cancel(&self, actor: &Actor, request_id: u64) -> Result<LeaveRequest, LeaveError> {
        self.ledger.cancel(actor, request_id).await
    }

    pub async fn get(&self, actor: &Actor, request_id: u64) -> Result<LeaveRequest, LeaveError> {
        self.ledger.get(actor, request_id).await
    }

    pub async fn list_by_employee(
        &self,
        actor: &Actor,
        employee_id: u64,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        self.ledger.list_by_employee(actor, employee_id).await
    }

    pub async fn document_view(
        &self,
        actor: &Actor,
        request_id: u64,
    ) -> Result<LeaveDocumentView, LeaveError> {
        self.ledger.document_view(actor, request_id).await
    }
}
