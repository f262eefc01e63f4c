//! Fire-and-forget notification dispatch.
//!
//! Services call [`NotificationSink::deliver`] after a state transition
//! (approval, alert send). Delivery is best-effort: a failing sink must never
//! roll back the transition, so the trait is infallible from the caller's
//! perspective and implementations handle their own errors.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub user_ids: Vec<Uuid>,
    pub title: String,
    pub body: String,
}

pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: Notification);
}

/// Default sink: records the dispatch in the log stream. A push-gateway sink
/// can replace this without touching any service code.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn deliver(&self, notification: Notification) {
        tracing::info!(
            recipients = notification.user_ids.len(),
            title = %notification.title,
            "notification dispatched"
        );
    }
}

pub type SharedSink = Arc<dyn NotificationSink>;
