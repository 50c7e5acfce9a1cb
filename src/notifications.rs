//! Mutation outcome notifications.
//!
//! Every create/update/delete/reorder reports its outcome here so the
//! presentation layer can show one discrete, attributable message per
//! mutation. Failures are never dropped silently: with no channel attached
//! they still reach the log.

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    /// e.g. "create task", "reorder tasks"
    pub operation: String,
    pub entity: &'static str,
    pub id: String,
    pub message: String,
}

impl Notification {
    pub fn success(operation: &str, entity: &'static str, id: &str) -> Self {
        Self {
            level: NotificationLevel::Success,
            operation: operation.to_string(),
            entity,
            id: id.to_string(),
            message: format!("{} {} succeeded", operation, id),
        }
    }

    pub fn failure(operation: &str, entity: &'static str, id: &str, reason: &str) -> Self {
        Self {
            level: NotificationLevel::Failure,
            operation: operation.to_string(),
            entity,
            id: id.to_string(),
            message: format!("Failed to {} ({} {}): {}", operation, entity, id, reason),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationSender {
    tx: Option<UnboundedSender<Notification>>,
}

impl NotificationSender {
    pub fn new(tx: Option<UnboundedSender<Notification>>) -> Self {
        Self { tx }
    }

    /// A sender plus the receiving end for the presentation layer
    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (tx, rx) = unbounded_channel();
        (Self::new(Some(tx)), rx)
    }

    pub fn send(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::debug!(
                operation = %notification.operation,
                entity = notification.entity,
                id = %notification.id,
                "Mutation confirmed"
            ),
            NotificationLevel::Failure => tracing::warn!(
                operation = %notification.operation,
                entity = notification.entity,
                id = %notification.id,
                "{}",
                notification.message
            ),
        }

        if let Some(tx) = &self.tx {
            if tx.send(notification).is_err() {
                tracing::debug!("Notification receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_with_no_channel() {
        let sender = NotificationSender::default();
        sender.send(Notification::success("create task", "Task", "t1"));
    }

    #[test]
    fn test_failure_message_names_entity() {
        let n = Notification::failure("update task", "Task", "t9", "disk full");
        assert_eq!(n.level, NotificationLevel::Failure);
        assert_eq!(n.message, "Failed to update task (Task t9): disk full");
    }

    #[tokio::test]
    async fn test_channel_delivers_in_order() {
        let (sender, mut rx) = NotificationSender::channel();
        sender.send(Notification::success("create task", "Task", "a"));
        sender.send(Notification::failure("delete task", "Task", "b", "gone"));

        assert_eq!(rx.recv().await.unwrap().id, "a");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.id, "b");
        assert_eq!(second.level, NotificationLevel::Failure);
    }
}
