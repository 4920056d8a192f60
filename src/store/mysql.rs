use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::{FromRow, MySql, MySqlPool, Transaction};

use super::{LeaveStore, LeaveTx};
use crate::error::{StoreError, StoreResult};
use crate::model::balance::LeaveBalanceConfig;
use crate::model::leave_request::{LeaveRequest, LeaveState, NewLeaveRequest};

const CONFIG_COLUMNS: &str = "employee_id, total_days_granted, approver_display_name";

const REQUEST_COLUMNS: &str = "id, employee_id, start_date, end_date, requested_days, \
     remaining_after_snapshot, state, created_at, updated_at";

// SUM over INT is DECIMAL in MySQL; cast so it decodes as i64.
const HELD_DAYS_SQL: &str = r#"
    SELECT CAST(COALESCE(SUM(requested_days), 0) AS SIGNED)
    FROM leave_requests
    WHERE employee_id = ?
    AND state IN ('pending', 'approved')
    AND (? IS NULL OR id <> ?)
"#;

#[derive(FromRow)]
struct ConfigRow {
    employee_id: u64,
    total_days_granted: u32,
    approver_display_name: String,
}

impl From<ConfigRow> for LeaveBalanceConfig {
    fn from(row: ConfigRow) -> Self {
        Self {
            employee_id: row.employee_id,
            total_days_granted: row.total_days_granted,
            approver_display_name: row.approver_display_name,
        }
    }
}

#[derive(FromRow)]
struct RequestRow {
    id: u64,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    requested_days: u32,
    remaining_after_snapshot: i64,
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let state = LeaveState::from_str(&row.state).map_err(|_| {
            StoreError::Corrupt(format!(
                "leave request {} has unknown state '{}'",
                row.id, row.state
            ))
        })?;

        Ok(Self {
            id: row.id,
            employee_id: row.employee_id,
            start_date: row.start_date,
            end_date: row.end_date,
            requested_days: row.requested_days,
            remaining_after_snapshot: row.remaining_after_snapshot,
            state,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Backend over the HRM MySQL database (`sql/schema.sql`).
#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl LeaveStore for MySqlLeaveStore {
    fn begin(&self) -> BoxFuture<'_, StoreResult<Box<dyn LeaveTx>>> {
        async move {
            let tx = self.pool.begin().await?;
            Ok(Box::new(MySqlTx { tx }) as Box<dyn LeaveTx>)
        }
        .boxed()
    }

    fn config(&self, employee_id: u64) -> BoxFuture<'_, StoreResult<Option<LeaveBalanceConfig>>> {
        async move {
            let sql = format!(
                "SELECT {} FROM leave_balance_configs WHERE employee_id = ?",
                CONFIG_COLUMNS
            );
            let row = sqlx::query_as::<_, ConfigRow>(&sql)
                .bind(employee_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row.map(LeaveBalanceConfig::from))
        }
        .boxed()
    }

    fn request(&self, request_id: u64) -> BoxFuture<'_, StoreResult<Option<LeaveRequest>>> {
        async move {
            let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", REQUEST_COLUMNS);
            let row = sqlx::query_as::<_, RequestRow>(&sql)
                .bind(request_id)
                .fetch_optional(&self.pool)
                .await?;
            row.map(LeaveRequest::try_from).transpose()
        }
        .boxed()
    }

    fn requests_by_employee(
        &self,
        employee_id: u64,
    ) -> BoxFuture<'_, StoreResult<Vec<LeaveRequest>>> {
        async move {
            let sql = format!(
                "SELECT {} FROM leave_requests WHERE employee_id = ? ORDER BY start_date, id",
                REQUEST_COLUMNS
            );
            let rows = sqlx::query_as::<_, RequestRow>(&sql)
                .bind(employee_id)
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(LeaveRequest::try_from).collect()
        }
        .boxed()
    }

    fn held_days(
        &self,
        employee_id: u64,
        exclude_request_id: Option<u64>,
    ) -> BoxFuture<'_, StoreResult<i64>> {
        async move {
            let held = sqlx::query_scalar::<_, i64>(HELD_DAYS_SQL)
                .bind(employee_id)
                .bind(exclude_request_id)
                .bind(exclude_request_id)
                .fetch_one(&self.pool)
                .await?;
            Ok(held)
        }
        .boxed()
    }
}

/// Locking reads (`FOR UPDATE`) always see the latest committed rows, and the
/// config row lock is what serializes mutators of one employee.
struct MySqlTx {
    tx: Transaction<'static, MySql>,
}

impl LeaveTx for MySqlTx {
    fn lock_config(
        &mut self,
        employee_id: u64,
    ) -> BoxFuture<'_, StoreResult<Option<LeaveBalanceConfig>>> {
        async move {
            let sql = format!(
                "SELECT {} FROM leave_balance_configs WHERE employee_id = ? FOR UPDATE",
                CONFIG_COLUMNS
            );
            let row = sqlx::query_as::<_, ConfigRow>(&sql)
                .bind(employee_id)
                .fetch_optional(&mut *self.tx)
                .await?;
            Ok(row.map(LeaveBalanceConfig::from))
        }
        .boxed()
    }

    fn upsert_config(&mut self, config: LeaveBalanceConfig) -> BoxFuture<'_, StoreResult<()>> {
        async move {
            sqlx::query(
                r#"
                INSERT INTO leave_balance_configs
                    (employee_id, total_days_granted, approver_display_name)
                VALUES (?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    total_days_granted = VALUES(total_days_granted),
                    approver_display_name = VALUES(approver_display_name)
                "#,
            )
            .bind(config.employee_id)
            .bind(config.total_days_granted)
            .bind(&config.approver_display_name)
            .execute(&mut *self.tx)
            .await?;
            Ok(())
        }
        .boxed()
    }

    fn lock_request(&mut self, request_id: u64) -> BoxFuture<'_, StoreResult<Option<LeaveRequest>>> {
        async move {
            let sql = format!(
                "SELECT {} FROM leave_requests WHERE id = ? FOR UPDATE",
                REQUEST_COLUMNS
            );
            let row = sqlx::query_as::<_, RequestRow>(&sql)
                .bind(request_id)
                .fetch_optional(&mut *self.tx)
                .await?;
            row.map(LeaveRequest::try_from).transpose()
        }
        .boxed()
    }

    fn held_days(
        &mut self,
        employee_id: u64,
        exclude_request_id: Option<u64>,
    ) -> BoxFuture<'_, StoreResult<i64>> {
        async move {
            let sql = format!("{} FOR UPDATE", HELD_DAYS_SQL.trim_end());
            let held = sqlx::query_scalar::<_, i64>(&sql)
                .bind(employee_id)
                .bind(exclude_request_id)
                .bind(exclude_request_id)
                .fetch_one(&mut *self.tx)
                .await?;
            Ok(held)
        }
        .boxed()
    }

    fn insert_request(&mut self, request: NewLeaveRequest) -> BoxFuture<'_, StoreResult<LeaveRequest>> {
        async move {
            let result = sqlx::query(
                r#"
                INSERT INTO leave_requests
                    (employee_id, start_date, end_date, requested_days, remaining_after_snapshot, state)
                VALUES (?, ?, ?, ?, ?, 'pending')
                "#,
            )
            .bind(request.employee_id)
            .bind(request.start_date)
            .bind(request.end_date)
            .bind(request.requested_days)
            .bind(request.remaining_after_snapshot)
            .execute(&mut *self.tx)
            .await?;

            let id = result.last_insert_id();
            let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", REQUEST_COLUMNS);
            let row = sqlx::query_as::<_, RequestRow>(&sql)
                .bind(id)
                .fetch_one(&mut *self.tx)
                .await?;
            LeaveRequest::try_from(row)
        }
        .boxed()
    }

    fn update_request(&mut self, request: LeaveRequest) -> BoxFuture<'_, StoreResult<LeaveRequest>> {
        async move {
            sqlx::query(
                r#"
                UPDATE leave_requests
                SET start_date = ?,
                    end_date = ?,
                    requested_days = ?,
                    remaining_after_snapshot = ?,
                    state = ?
                WHERE id = ?
                "#,
            )
            .bind(request.start_date)
            .bind(request.end_date)
            .bind(request.requested_days)
            .bind(request.remaining_after_snapshot)
            .bind(request.state.as_ref())
            .bind(request.id)
            .execute(&mut *self.tx)
            .await?;

            let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", REQUEST_COLUMNS);
            let row = sqlx::query_as::<_, RequestRow>(&sql)
                .bind(request.id)
                .fetch_one(&mut *self.tx)
                .await?;
            LeaveRequest::try_from(row)
        }
        .boxed()
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StoreResult<()>> {
        let MySqlTx { tx } = *self;
        async move {
            tx.commit().await?;
            Ok(())
        }
        .boxed()
    }
}
