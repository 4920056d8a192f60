//! Audit trail written by the HTTP host after each successful mutation.

use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::MySqlPool;
use tokio::sync::Mutex;

use crate::auth::actor::Actor;

pub trait AuditLog: Send + Sync {
    fn record(&self, actor: &Actor, action: &str, module: &str) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Records an entry; a failing audit write never fails the request.
pub async fn record_best_effort(log: &dyn AuditLog, actor: &Actor, action: &str, module: &str) {
    if let Err(e) = log.record(actor, action, module).await {
        tracing::warn!(error = %e, user_id = actor.user_id, action, "Failed to write audit log");
    }
}

pub struct MySqlAuditLog {
    pool: MySqlPool,
}

impl MySqlAuditLog {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl AuditLog for MySqlAuditLog {
    fn record(&self, actor: &Actor, action: &str, module: &str) -> BoxFuture<'_, anyhow::Result<()>> {
        let user_id = actor.user_id;
        let username = actor.username.clone();
        let action = action.to_string();
        let module = module.to_string();
        async move {
            sqlx::query(
                r#"
                INSERT INTO audit_log (user_id, username, action, module)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(user_id)
            .bind(username)
            .bind(action)
            .bind(module)
            .execute(&self.pool)
            .await?;
            Ok(())
        }
        .boxed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub user_id: u64,
    pub action: String,
    pub module: String,
}

#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }
}

impl AuditLog for MemoryAuditLog {
    fn record(&self, actor: &Actor, action: &str, module: &str) -> BoxFuture<'_, anyhow::Result<()>> {
        let entry = AuditEntry {
            user_id: actor.user_id,
            action: action.to_string(),
            module: module.to_string(),
        };
        async move {
            self.entries.lock().await.push(entry);
            Ok(())
        }
        .boxed()
    }
}
