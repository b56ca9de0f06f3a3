use crate::notification::Notification;
use async_channel::{Receiver, Sender};
use parking_lot::RwLock;

/// Multi-producer, multi-subscriber event bus. Publication is fire-and-forget: a
/// subscriber whose channel is full or has been dropped is pruned rather than
/// allowed to block or panic the publisher.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: std::sync::Arc<RwLock<Vec<Sender<Notification>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its receiving end. `capacity` bounds
    /// the channel so a slow subscriber cannot grow memory unboundedly; publish still
    /// never blocks the caller — a full channel just drops that notification for
    /// that subscriber.
    pub fn subscribe(&self, capacity: usize) -> Receiver<Notification> {
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        self.subscribers.write().push(tx);
        rx
    }

    /// Publishes to every live subscriber, pruning any whose receiver has been
    /// dropped. Never suspends the caller waiting on a slow subscriber.
    pub fn publish(&self, notification: Notification) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| {
            if tx.is_closed() {
                return false;
            }
            if let Err(err) = tx.try_send(notification.clone()) {
                if err.is_closed() {
                    return false;
                }
                log::warn!("dropping notification for a full subscriber channel: {err}");
            }
            true
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::RawTxAddedNotification;
    use cubic_hashes::Hash;
    use std::sync::Arc;

    #[tokio::test]
    async fn subscribers_receive_published_notifications() {
        let bus = EventBus::new();
        let rx1 = bus.subscribe(8);
        let rx2 = bus.subscribe(8);
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(Notification::RawTxAdded(Arc::new(RawTxAddedNotification {
            raw_tx_id: Hash::ZERO,
            leader_id: "L1".to_string(),
        })));

        assert!(matches!(rx1.recv().await.unwrap(), Notification::RawTxAdded(_)));
        assert!(matches!(rx2.recv().await.unwrap(), Notification::RawTxAdded(_)));
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned_on_publish() {
        let bus = EventBus::new();
        {
            let _rx = bus.subscribe(8);
        }
        assert_eq!(bus.subscriber_count(), 1);
        bus.publish(Notification::RawTxAdded(Arc::new(RawTxAddedNotification {
            raw_tx_id: Hash::ZERO,
            leader_id: "L1".to_string(),
        })));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
