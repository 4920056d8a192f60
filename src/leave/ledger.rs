//! Leave request lifecycle.
//!
//! ```text
//! PENDING ──approve──▶ APPROVED
//!    │                    │
//!    └──cancel──▶ CANCELLED ◀──cancel (admin)
//! ```
//!
//! Each mutation locks the employee's config, re-derives the balance and
//! writes in one transaction. Notifications go out after the commit.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use super::calculator::BalanceCalculator;
use super::days::inclusive_day_count;
use super::notifier::NotificationEmitter;
use crate::auth::actor::Actor;
use crate::auth::gate::{AuthorizationGate, Operation};
use crate::error::LeaveError;
use crate::model::balance::LeaveBalanceConfig;
use crate::model::leave_request::{LeaveRequest, LeaveState, NewLeaveRequest};
use crate::model::notification::NotificationKind;
use crate::store::{LeaveStore, LeaveTx};

/// What an external document renderer needs for one request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct LeaveDocumentView {
    #[schema(example = 1)]
    pub request_id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-14", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 5)]
    pub requested_days: u32,
    #[schema(example = 9)]
    pub remaining_after_snapshot: i64,
    pub state: LeaveState,
    #[schema(example = "Jane Smith, Head of HR")]
    pub approver_display_name: String,
}

struct Notice {
    recipient_employee_id: u64,
    kind: NotificationKind,
    message: String,
    related_request_id: u64,
}

#[derive(Clone)]
pub struct RequestLedger {
    store: Arc<dyn LeaveStore>,
    gate: AuthorizationGate,
    notifier: NotificationEmitter,
}

impl RequestLedger {
    pub fn new(store: Arc<dyn LeaveStore>, notifier: NotificationEmitter) -> Self {
        Self {
            store,
            gate: AuthorizationGate,
            notifier,
        }
    }

    #[instrument(skip(self, actor), fields(user_id = actor.user_id))]
    pub async fn create(
        &self,
        actor: &Actor,
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<LeaveRequest, LeaveError> {
        self.gate.check(actor, Operation::CreateRequest, employee_id)?;
        let requested_days = inclusive_day_count(start_date, end_date)?;

        let mut tx = self.store.begin().await?;
        let config = tx
            .lock_config(employee_id)
            .await?
            .ok_or(LeaveError::NotConfigured { employee_id })?;
        let projected = reserve(&mut *tx, &config, None, requested_days).await?;

        let request = tx
            .insert_request(NewLeaveRequest {
                employee_id,
                start_date,
                end_date,
                requested_days,
                remaining_after_snapshot: projected,
            })
            .await?;
        tx.commit().await?;

        info!(
            request_id = request.id,
            employee_id,
            requested_days,
            remaining = projected,
            "Leave request created"
        );
        Ok(request)
    }

    /// Moves a pending request to new dates, checked against the balance
    /// without its own previous reservation.
    #[instrument(skip(self, actor), fields(user_id = actor.user_id))]
    pub async fn edit(
        &self,
        actor: &Actor,
        request_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<LeaveRequest, LeaveError> {
        let employee_id = self.owner_of(request_id).await?;

        let mut tx = self.store.begin().await?;
        let config = tx.lock_config(employee_id).await?;
        let request = locked_request(&mut *tx, request_id).await?;
        if request.state != LeaveState::Pending {
            return Err(LeaveError::NotEditable {
                request_id,
                state: request.state,
            });
        }
        self.gate
            .check(actor, Operation::EditRequest, request.employee_id)?;

        let requested_days = inclusive_day_count(start_date, end_date)?;
        let config = config.ok_or(LeaveError::NotConfigured { employee_id })?;
        let projected = reserve(&mut *tx, &config, Some(request_id), requested_days).await?;

        let updated = LeaveRequest {
            start_date,
            end_date,
            requested_days,
            remaining_after_snapshot: projected,
            ..request
        };
        let updated = tx.update_request(updated).await?;
        tx.commit().await?;

        info!(request_id, employee_id, requested_days, remaining = projected, "Leave request edited");
        Ok(updated)
    }

    #[instrument(skip(self, actor), fields(user_id = actor.user_id))]
    pub async fn approve(&self, actor: &Actor, request_id: u64) -> Result<LeaveRequest, LeaveError> {
        self.gate.check_capability(actor, Operation::Approve)?;
        let employee_id = self.owner_of(request_id).await?;

        let mut tx = self.store.begin().await?;
        tx.lock_config(employee_id).await?;
        let request = locked_request(&mut *tx, request_id).await?;
        match request.state {
            LeaveState::Pending => {}
            LeaveState::Approved => return Err(LeaveError::AlreadyApproved { request_id }),
            LeaveState::Cancelled => return Err(LeaveError::AlreadyCancelled { request_id }),
        }

        let approved = LeaveRequest {
            state: LeaveState::Approved,
            ..request
        };
        let approved = tx.update_request(approved).await?;
        tx.commit().await?;
        info!(request_id, employee_id, "Leave request approved");

        self.send(Notice {
            recipient_employee_id: approved.employee_id,
            kind: NotificationKind::Approved,
            message: format!(
                "Your leave from {} to {} ({} days) has been approved.",
                approved.start_date, approved.end_date, approved.requested_days
            ),
            related_request_id: request_id,
        })
        .await;

        Ok(approved)
    }

    /// Cancelling releases the request's days: cancelled rows are simply left
    /// out of the balance sum.
    #[instrument(skip(self, actor), fields(user_id = actor.user_id))]
    pub async fn cancel(&self, actor: &Actor, request_id: u64) -> Result<LeaveRequest, LeaveError> {
        let employee_id = self.owner_of(request_id).await?;

        let mut tx = self.store.begin().await?;
        tx.lock_config(employee_id).await?;
        let request = locked_request(&mut *tx, request_id).await?;
        if request.state == LeaveState::Cancelled {
            return Err(LeaveError::AlreadyCancelled { request_id });
        }
        self.gate.check(
            actor,
            Operation::cancel_for(request.state),
            request.employee_id,
        )?;

        let previous = request.state;
        let cancelled = LeaveRequest {
            state: LeaveState::Cancelled,
            ..request
        };
        let cancelled = tx.update_request(cancelled).await?;
        tx.commit().await?;
        info!(request_id, employee_id, was = %previous, "Leave request cancelled");

        if let Some(notice) = cancel_notice(actor, previous, &cancelled) {
            self.send(notice).await;
        }

        Ok(cancelled)
    }

    pub async fn get(&self, actor: &Actor, request_id: u64) -> Result<LeaveRequest, LeaveError> {
        let request = self
            .store
            .request(request_id)
            .await?
            .ok_or(LeaveError::NotFound { request_id })?;
        self.gate
            .check(actor, Operation::ViewLeave, request.employee_id)?;
        Ok(request)
    }

    pub async fn list_by_employee(
        &self,
        actor: &Actor,
        employee_id: u64,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        self.gate.check(actor, Operation::ViewLeave, employee_id)?;
        Ok(self.store.requests_by_employee(employee_id).await?)
    }

    pub async fn document_view(
        &self,
        actor: &Actor,
        request_id: u64,
    ) -> Result<LeaveDocumentView, LeaveError> {
        let request = self.get(actor, request_id).await?;
        let config: LeaveBalanceConfig = self
            .store
            .config(request.employee_id)
            .await?
            .ok_or(LeaveError::NotConfigured {
                employee_id: request.employee_id,
            })?;

        Ok(LeaveDocumentView {
            request_id: request.id,
            employee_id: request.employee_id,
            start_date: request.start_date,
            end_date: request.end_date,
            requested_days: request.requested_days,
            remaining_after_snapshot: request.remaining_after_snapshot,
            state: request.state,
            approver_display_name: config.approver_display_name,
        })
    }

    // A request's owner never changes, so it is safe to read before locking.
    async fn owner_of(&self, request_id: u64) -> Result<u64, LeaveError> {
        self.store
            .request(request_id)
            .await?
            .map(|r| r.employee_id)
            .ok_or(LeaveError::NotFound { request_id })
    }

    async fn send(&self, notice: Notice) {
        self.notifier
            .emit(
                notice.recipient_employee_id,
                notice.kind,
                notice.message,
                notice.related_request_id,
            )
            .await;
    }
}

async fn locked_request(tx: &mut dyn LeaveTx, request_id: u64) -> Result<LeaveRequest, LeaveError> {
    tx.lock_request(request_id)
        .await?
        .ok_or(LeaveError::NotFound { request_id })
}

/// Balance left once `requested_days` are held; all or nothing.
async fn reserve(
    tx: &mut dyn LeaveTx,
    config: &LeaveBalanceConfig,
    exclude_request_id: Option<u64>,
    requested_days: u32,
) -> Result<i64, LeaveError> {
    let remaining = BalanceCalculator::remaining_within(tx, config, exclude_request_id).await?;
    let projected = remaining - i64::from(requested_days);
    if projected < 0 {
        return Err(LeaveError::InsufficientBalance {
            requested: requested_days,
            remaining,
        });
    }
    Ok(projected)
}

fn cancel_notice(actor: &Actor, previous: LeaveState, cancelled: &LeaveRequest) -> Option<Notice> {
    let (kind, message) = match previous {
        LeaveState::Approved => (
            NotificationKind::CancelledWithRefund,
            format!(
                "Your approved leave from {} to {} was cancelled; {} days were returned to your balance.",
                cancelled.start_date, cancelled.end_date, cancelled.requested_days
            ),
        ),
        LeaveState::Pending if actor.is_administrative() && !actor.is_self(cancelled.employee_id) => (
            NotificationKind::CancelledByAdmin,
            format!(
                "Your leave request from {} to {} was cancelled by {}.",
                cancelled.start_date, cancelled.end_date, actor.username
            ),
        ),
        _ => return None,
    };

    Some(Notice {
        recipient_employee_id: cancelled.employee_id,
        kind,
        message,
        related_request_id: cancelled.id,
    })
}
