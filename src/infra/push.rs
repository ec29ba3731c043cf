//! In-process fan-out of push notices to connected clients.

use tokio::sync::broadcast;
use tracing::debug;

use crate::core::error::PushError;
use crate::core::job::PushChannel;
use crate::core::model::UserId;

/// Default number of notices buffered per subscriber.
pub const DEFAULT_HUB_CAPACITY: usize = 64;

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Recipient.
    pub user_id: UserId,
    /// Raw message bytes.
    pub payload: Vec<u8>,
}

/// Broadcast hub; every socket subscribes and keeps the notices for its user.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notice>,
}

impl NotificationHub {
    /// Create a hub buffering up to `capacity` notices per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to every notice published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publish `payload` to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::NoSubscribers`] when no socket is connected.
    pub fn publish(&self, user_id: UserId, payload: &[u8]) -> Result<(), PushError> {
        let notice = Notice {
            user_id,
            payload: payload.to_vec(),
        };
        let receivers = self.tx.send(notice).map_err(|_| PushError::NoSubscribers)?;
        debug!(user_id = user_id, receivers = receivers, "notice published");
        Ok(())
    }

    /// Push channel bound to one user.
    #[must_use]
    pub fn channel_for(&self, user_id: UserId) -> UserPushChannel {
        UserPushChannel {
            hub: self.clone(),
            user_id,
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

/// [`PushChannel`] that publishes to a single user through the hub.
#[derive(Debug, Clone)]
pub struct UserPushChannel {
    hub: NotificationHub,
    user_id: UserId,
}

impl PushChannel for UserPushChannel {
    fn send(&self, message: &[u8]) -> Result<(), PushError> {
        self.hub.publish(self.user_id, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_fails() {
        let hub = NotificationHub::default();
        assert_eq!(hub.channel_for(1).send(b"hi"), Err(PushError::NoSubscribers));
    }

    #[tokio::test]
    async fn test_subscribers_receive_addressed_notices() {
        let hub = NotificationHub::default();
        let mut rx = hub.subscribe();
        hub.channel_for(7).send(b"ready").unwrap();

        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.user_id, 7);
        assert_eq!(notice.payload, b"ready");
    }
}
