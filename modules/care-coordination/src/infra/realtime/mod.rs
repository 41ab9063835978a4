//! Per-user real-time channels.
//!
//! One `broadcast` sender per user id, created on first subscribe. Events published
//! to a user with no live receivers are dropped; that user's entry is then removed,
//! so idle channels do not accumulate.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::domain::events::NotificationEvent;
use crate::domain::ports::EventPublisher;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct UserChannels {
    inner: Arc<DashMap<Uuid, broadcast::Sender<NotificationEvent>>>,
    capacity: usize,
}

impl Default for UserChannels {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl UserChannels {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Join the channel of `user_id`.
    #[must_use]
    pub fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<NotificationEvent> {
        let rx = self
            .inner
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        debug!(%user_id, "joined real-time channel");
        rx
    }

    /// Deliver `event` to every live receiver on `user_id`'s channel.
    /// Returns the number of receivers reached.
    pub fn send_to(&self, user_id: Uuid, event: NotificationEvent) -> usize {
        let Some(tx) = self.inner.get(&user_id).map(|e| e.value().clone()) else {
            trace!(%user_id, event = event.name(), "no channel; event dropped");
            return 0;
        };
        if let Ok(n) = tx.send(event) {
            n
        } else {
            // Last receiver is gone. Re-check under the shard lock so a concurrent
            // subscribe is not dropped along with the entry.
            self.inner
                .remove_if(&user_id, |_, tx| tx.receiver_count() == 0);
            debug!(%user_id, "pruned idle real-time channel");
            0
        }
    }

    /// Number of users with a registered channel.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.inner.len()
    }
}

impl EventPublisher<NotificationEvent> for UserChannels {
    fn publish(&self, event: &NotificationEvent) {
        let reached = self.send_to(event.user_id(), event.clone());
        debug!(event = event.name(), user_id = %event.user_id(), reached, "published");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_event(user_id: Uuid) -> NotificationEvent {
        NotificationEvent::Read {
            notification_id: Uuid::now_v7(),
            user_id,
        }
    }

    #[tokio::test]
    async fn delivers_only_to_target_user() {
        let channels = UserChannels::default();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let mut alice_rx = channels.subscribe(alice);
        let mut bob_rx = channels.subscribe(bob);

        let ev = read_event(alice);
        channels.publish(&ev);

        assert_eq!(alice_rx.recv().await.unwrap(), ev);
        assert!(matches!(
            bob_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn publish_without_subscriber_is_dropped() {
        let channels = UserChannels::default();
        assert_eq!(channels.send_to(Uuid::now_v7(), read_event(Uuid::now_v7())), 0);
        assert_eq!(channels.channel_count(), 0);
    }

    #[test]
    fn idle_channel_is_pruned_on_next_publish() {
        let channels = UserChannels::default();
        let user = Uuid::now_v7();
        let rx = channels.subscribe(user);
        assert_eq!(channels.channel_count(), 1);

        drop(rx);
        assert_eq!(channels.send_to(user, read_event(user)), 0);
        assert_eq!(channels.channel_count(), 0);
    }

    #[tokio::test]
    async fn every_tab_of_a_user_receives_the_event() {
        let channels = UserChannels::default();
        let user = Uuid::now_v7();
        let mut a = channels.subscribe(user);
        let mut b = channels.subscribe(user);

        assert_eq!(channels.send_to(user, read_event(user)), 2);
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }
}
