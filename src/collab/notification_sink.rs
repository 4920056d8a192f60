use anyhow::anyhow;
use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::MySqlPool;
use tokio::sync::Mutex;

use crate::model::notification::NotificationEvent;

/// Delivery transport for leave notifications.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, event: NotificationEvent) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Writes to the `notifications` inbox of the recipient's user account.
pub struct MySqlNotificationSink {
    pool: MySqlPool,
}

impl MySqlNotificationSink {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl NotificationSink for MySqlNotificationSink {
    fn deliver(&self, event: NotificationEvent) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            let user_id = sqlx::query_scalar::<_, u64>(
                "SELECT id FROM users WHERE employee_id = ? LIMIT 1",
            )
            .bind(event.recipient_employee_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                anyhow!(
                    "employee {} has no user account",
                    event.recipient_employee_id
                )
            })?;

            sqlx::query(
                r#"
                INSERT INTO notifications
                    (event_id, user_id, kind, message, related_request_id)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(event.event_id.to_string())
            .bind(user_id)
            .bind(event.kind.as_ref())
            .bind(&event.message)
            .bind(event.related_request_id)
            .execute(&self.pool)
            .await?;

            Ok(())
        }
        .boxed()
    }
}

/// Keeps delivered events in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().await.clone()
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&self, event: NotificationEvent) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            tracing::debug!(kind = %event.kind, recipient = event.recipient_employee_id, "Notification recorded");
            self.events.lock().await.push(event);
            Ok(())
        }
        .boxed()
    }
}
