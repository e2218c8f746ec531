//! Change notification
//!
//! Structural changes (add/remove, i.e. attach/detach) and in-place updates
//! are published as immutable [`Notification`] records. The records only
//! carry identifiers and a scalar snapshot, never object handles, so they can
//! be queued and consumed on another task without touching the object graph.
//!
//! Delivery is fire-and-forget: a notifier failure is logged by the scope and
//! never rolls back the change that produced it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::ids::{ObjectKey, PublicId};
use crate::object::Object;

/// Kind of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// A child was added to (attached to) a parent
    Add,
    /// A child was removed from (detached from) a parent
    Remove,
    /// A child changed in place
    Update,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change event: `operation` applied to the child `key` of `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub operation: Operation,
    pub parent_id: PublicId,
    pub class_name: String,
    pub key: ObjectKey,
    /// Scalar attributes of the child at the time of the change
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new(operation: Operation, parent_id: PublicId, child: &dyn Object) -> Self {
        Self {
            operation,
            parent_id,
            class_name: child.class_name().to_string(),
            key: child.key(),
            payload: child.snapshot(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    ChannelClosed,
    #[error("Notification buffer full ({capacity} pending)")]
    BufferFull { capacity: usize },
    #[error("Notifier rejected event: {0}")]
    Rejected(String),
}

/// Receiver of change notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

// =============================================================================
// Channel notifier
// =============================================================================

/// Pushes notifications onto an unbounded channel for asynchronous consumers
/// (persistence, messaging).
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier together with the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn from_sender(sender: mpsc::UnboundedSender<Notification>) -> Self {
        Self { sender }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sender
            .send(notification)
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

// =============================================================================
// Buffering notifier
// =============================================================================

/// In-memory queue of pending notifications, drained by the owner.
#[derive(Debug, Default)]
pub struct NotificationBuffer {
    pending: RefCell<VecDeque<Notification>>,
    capacity: Option<usize>,
}

impl NotificationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer that rejects notifications once `capacity` are pending.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: RefCell::new(VecDeque::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Takes all pending notifications in emission order.
    pub fn drain(&self) -> Vec<Notification> {
        self.pending.borrow_mut().drain(..).collect()
    }
}

impl Notifier for NotificationBuffer {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let mut pending = self.pending.borrow_mut();
        if let Some(capacity) = self.capacity {
            if pending.len() >= capacity {
                return Err(NotifyError::BufferFull { capacity });
            }
        }
        pending.push_back(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Comment;

    fn sample(operation: Operation) -> Notification {
        let comment = Comment::new("note", "Station relocated");
        let comment = comment.borrow();
        Notification::new(operation, PublicId::new("P1").unwrap(), &*comment)
    }

    #[test]
    fn notification_captures_child_snapshot() {
        let notification = sample(Operation::Add);
        assert_eq!(notification.class_name, "Comment");
        assert_eq!(notification.parent_id.as_str(), "P1");
        assert_eq!(notification.payload["text"], "Station relocated");
    }

    #[test]
    fn notification_serializes_camel_case() {
        let json = serde_json::to_value(sample(Operation::Remove)).unwrap();
        assert_eq!(json["operation"], "remove");
        assert_eq!(json["parentId"], "P1");
        assert_eq!(json["className"], "Comment");
    }

    #[test]
    fn buffer_drains_in_order() {
        let buffer = NotificationBuffer::new();
        buffer.notify(sample(Operation::Add)).unwrap();
        buffer.notify(sample(Operation::Update)).unwrap();

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].operation, Operation::Add);
        assert_eq!(drained[1].operation, Operation::Update);
        assert!(buffer.is_empty());
    }

    #[test]
    fn bounded_buffer_rejects_when_full() {
        let buffer = NotificationBuffer::with_capacity(1);
        buffer.notify(sample(Operation::Add)).unwrap();

        let err = buffer.notify(sample(Operation::Add)).unwrap_err();
        assert_eq!(err, NotifyError::BufferFull { capacity: 1 });
        assert_eq!(buffer.len(), 1);
    }

    #[tokio::test]
    async fn channel_notifier_delivers_to_async_consumer() {
        let (notifier, mut receiver) = ChannelNotifier::new();
        notifier.notify(sample(Operation::Add)).unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.operation, Operation::Add);
    }

    #[test]
    fn channel_notifier_reports_closed_channel() {
        let (notifier, receiver) = ChannelNotifier::new();
        drop(receiver);

        let err = notifier.notify(sample(Operation::Add)).unwrap_err();
        assert_eq!(err, NotifyError::ChannelClosed);
    }
}
