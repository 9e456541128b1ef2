use crate::domain::model::Snapshot;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

pub type SubscriberId = u64;

/// Snapshots a subscriber may fall behind before it is dropped.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 1024;

/// Registry of open result streams.
///
/// Every write is a non-blocking `try_send`. A subscriber whose channel is
/// closed or full is dropped from the registry on the spot.
#[derive(Debug)]
pub struct BroadcastHub {
    subscribers: HashMap<SubscriberId, mpsc::Sender<Snapshot>>,
    next_id: SubscriberId,
    buffer: usize,
}

impl BroadcastHub {
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: HashMap::new(),
            next_id: 0,
            buffer: buffer.max(1),
        }
    }

    /// Register a new subscriber and hand it `initial` straight away.
    pub fn subscribe(&mut self, initial: Snapshot) -> (SubscriberId, mpsc::Receiver<Snapshot>) {
        let (tx, rx) = mpsc::channel(self.buffer);
        // a fresh channel always has room for one message
        let _ = tx.try_send(initial);

        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, tx);

        tracing::debug!("Subscriber {} joined ({} open)", id, self.subscribers.len());
        (id, rx)
    }

    /// Returns whether `id` was still registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!("Subscriber {} left ({} open)", id, self.subscribers.len());
        }
        removed
    }

    /// Fan `snapshot` out to everyone. Returns how many subscribers remain.
    pub fn publish(&mut self, snapshot: &Snapshot) -> usize {
        self.subscribers
            .retain(|id, tx| match tx.try_send(snapshot.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Dropping subscriber {}: not keeping up", id);
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!("Dropping subscriber {}: connection closed", id);
                    false
                }
            });
        self.subscribers.len()
    }

    /// Drop every subscriber, ending their streams.
    pub fn clear(&mut self) -> usize {
        let dropped = self.subscribers.len();
        self.subscribers.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ResetToken;

    fn snapshot(token: &str, total_voters: usize) -> Snapshot {
        Snapshot {
            votes: HashMap::new(),
            total_voters,
            reset_token: ResetToken::new(token),
        }
    }

    #[test]
    fn test_subscribe_delivers_initial_snapshot() {
        let mut hub = BroadcastHub::new(4);
        let (_, mut rx) = hub.subscribe(snapshot("1", 0));

        assert_eq!(rx.try_recv().unwrap(), snapshot("1", 0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_reaches_every_subscriber_in_order() {
        let mut hub = BroadcastHub::new(4);
        let (_, mut a) = hub.subscribe(snapshot("1", 0));
        let (_, mut b) = hub.subscribe(snapshot("1", 0));

        assert_eq!(hub.publish(&snapshot("1", 1)), 2);
        assert_eq!(hub.publish(&snapshot("2", 0)), 2);

        for rx in [&mut a, &mut b] {
            assert_eq!(rx.try_recv().unwrap().total_voters, 0);
            assert_eq!(rx.try_recv().unwrap(), snapshot("1", 1));
            assert_eq!(rx.try_recv().unwrap(), snapshot("2", 0));
        }
    }

    #[test]
    fn test_closed_subscriber_is_dropped_silently() {
        let mut hub = BroadcastHub::new(4);
        let (closed_id, closed) = hub.subscribe(snapshot("1", 0));
        let (open_id, mut open) = hub.subscribe(snapshot("1", 0));
        drop(closed);

        assert_eq!(hub.publish(&snapshot("1", 1)), 1);
        assert!(!hub.contains(closed_id));
        assert!(hub.contains(open_id));

        open.try_recv().unwrap();
        assert_eq!(open.try_recv().unwrap().total_voters, 1);
    }

    #[test]
    fn test_slow_subscriber_is_dropped_without_blocking_others() {
        let mut hub = BroadcastHub::new(2);
        let (slow_id, _slow) = hub.subscribe(snapshot("1", 0));
        let (fast_id, mut fast) = hub.subscribe(snapshot("1", 0));

        for voters in 1..=3 {
            fast.try_recv().unwrap();
            hub.publish(&snapshot("1", voters));
        }

        assert!(!hub.contains(slow_id));
        assert!(hub.contains(fast_id));
        assert_eq!(fast.try_recv().unwrap().total_voters, 3);
    }

    #[test]
    fn test_default_buffer_absorbs_a_burst() {
        let mut hub = BroadcastHub::new(DEFAULT_SUBSCRIBER_BUFFER);
        let (id, mut rx) = hub.subscribe(snapshot("1", 0));

        for voters in 1..=500 {
            hub.publish(&snapshot("1", voters));
        }

        assert!(hub.contains(id));
        for expected in 0..=500 {
            assert_eq!(rx.try_recv().unwrap().total_voters, expected);
        }
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let mut hub = BroadcastHub::new(4);
        let (id, rx) = hub.subscribe(snapshot("1", 0));

        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        assert!(hub.is_empty());

        drop(rx);
        assert!(!hub.unsubscribe(id));
        assert_eq!(hub.publish(&snapshot("1", 1)), 0);
    }
}
