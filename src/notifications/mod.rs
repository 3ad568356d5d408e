//! Notification intents emitted by the placement state machine.
//!
//! The state machine never formats or delivers anything itself. After a
//! transaction commits it hands a [`NotificationIntent`] to a [`Notifier`],
//! which must return immediately and must not fail the caller.

pub mod redis_queue;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::redis_queue::RedisNotifier;

/// Events the state machine reports to interested users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PlacementCancelled,
    PlacementRejectedByAdmin,
    PlacementExpired,
    PlacementFinalized,
    ResponseReceived,
    ResponseAccepted,
    ResponseRejected,
    ResponseCancelled,
    TransferConfirmed,
    TransferDisputed,
    TransferRejected,
    TransferCanceled,
    TransferExpired,
}

/// A fire-and-forget request to tell `user_id` about `event_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub user_id: Uuid,
    pub event_type: EventType,
    pub payload: serde_json::Value,
}

impl NotificationIntent {
    pub fn new(user_id: Uuid, event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            user_id,
            event_type,
            payload,
        }
    }
}

/// Sink for notification intents.
///
/// Implementations must not block the caller; delivery failures are theirs
/// to log.
pub trait Notifier: Send + Sync {
    fn notify(&self, intent: NotificationIntent);
}

/// Dispatch a batch of intents collected during a committed transaction.
pub fn dispatch(notifier: &dyn Notifier, intents: Vec<NotificationIntent>) {
    for intent in intents {
        tracing::debug!(
            user_id = %intent.user_id,
            event = ?intent.event_type,
            "dispatching notification intent"
        );
        notifier.notify(intent);
    }
}

/// Writes intents to the log and nothing else. Used when no queue is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, intent: NotificationIntent) {
        tracing::info!(
            user_id = %intent.user_id,
            event = ?intent.event_type,
            payload = %intent.payload,
            "notification"
        );
    }
}
