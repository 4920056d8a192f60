use std::sync::Arc;

use crate::collab::notification_sink::NotificationSink;
use crate::model::notification::{NotificationEvent, NotificationKind};

/// Post-commit hook for ledger transitions. Delivery failures are logged and
/// otherwise ignored.
#[derive(Clone)]
pub struct NotificationEmitter {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationEmitter {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub async fn emit(
        &self,
        recipient_employee_id: u64,
        kind: NotificationKind,
        message: String,
        related_request_id: u64,
    ) {
        let event = NotificationEvent::new(recipient_employee_id, kind, message, related_request_id);
        let event_id = event.event_id;

        match self.sink.deliver(event).await {
            Ok(()) => tracing::debug!(%event_id, %kind, recipient_employee_id, "Notification sent"),
            Err(e) => tracing::warn!(
                error = %e,
                %event_id,
                %kind,
                recipient_employee_id,
                related_request_id,
                "Failed to deliver leave notification"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::notification_sink::RecordingSink;
    use futures::FutureExt;
    use futures::future::BoxFuture;

    struct BrokenSink;

    impl NotificationSink for BrokenSink {
        fn deliver(&self, _: NotificationEvent) -> BoxFuture<'_, anyhow::Result<()>> {
            async { Err(anyhow::anyhow!("recipient has no account")) }.boxed()
        }
    }

    #[actix_web::test]
    async fn emitted_event_reaches_the_sink() {
        let sink = Arc::new(RecordingSink::new());
        let emitter = NotificationEmitter::new(sink.clone());

        emitter
            .emit(7, NotificationKind::Approved, "approved".into(), 3)
            .await;

        let events = sink.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipient_employee_id, 7);
        assert_eq!(events[0].kind, NotificationKind::Approved);
        assert_eq!(events[0].related_request_id, 3);
    }

    #[actix_web::test]
    async fn delivery_failure_is_swallowed() {
        let emitter = NotificationEmitter::new(Arc::new(BrokenSink));
        emitter
            .emit(7, NotificationKind::CancelledByAdmin, "cancelled".into(), 3)
            .await;
    }
}
