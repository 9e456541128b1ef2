use crate::core::hub::{BroadcastHub, SubscriberId};
use crate::core::ledger::Ledger;
use crate::domain::model::{ResetToken, Snapshot};
use crate::utils::error::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;

struct Inner {
    ledger: Ledger,
    hub: BroadcastHub,
}

/// The live poll: ledger and subscriber registry behind one lock.
///
/// Mutation and fan-out share a critical section, so every subscriber sees
/// snapshots in exactly the order the changes were accepted.
pub struct LivePoll {
    inner: Mutex<Inner>,
}

impl LivePoll {
    pub fn new(subscriber_buffer: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                ledger: Ledger::new(),
                hub: BroadcastHub::new(subscriber_buffer),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // ledger updates never panic halfway, so a poisoned lock still guards valid state
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn submit(&self, choice: &str, voter_id: &str) -> Result<ResetToken> {
        let mut inner = self.lock();
        inner.ledger.submit(choice, voter_id)?;

        let snapshot = inner.ledger.snapshot();
        let listeners = inner.hub.publish(&snapshot);
        tracing::debug!(
            "Vote for {:?} accepted ({} voters, {} listeners)",
            choice,
            snapshot.total_voters,
            listeners
        );
        Ok(snapshot.reset_token)
    }

    pub fn reset(&self) -> ResetToken {
        let mut inner = self.lock();
        let token = inner.ledger.reset();

        let snapshot = inner.ledger.snapshot();
        let listeners = inner.hub.publish(&snapshot);
        tracing::info!("Votes reset, new epoch {} ({} listeners)", token, listeners);
        token
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().ledger.snapshot()
    }

    pub fn reset_token(&self) -> ResetToken {
        self.lock().ledger.reset_token()
    }

    /// Open a result stream. The current snapshot is already queued on it.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let mut inner = self.lock();
        let snapshot = inner.ledger.snapshot();
        let (id, receiver) = inner.hub.subscribe(snapshot);

        Subscription {
            id,
            receiver,
            poll: Arc::downgrade(self),
        }
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.lock().hub.unsubscribe(id)
    }

    /// End every open result stream. Used on shutdown so that long-lived
    /// connections do not hold the server open.
    pub fn disconnect_all(&self) -> usize {
        self.lock().hub.clear()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().hub.len()
    }
}

/// Handle for one open result stream. Dropping it deregisters the subscriber.
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Snapshot>,
    poll: Weak<LivePoll>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next snapshot, or `None` once the hub has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(poll) = self.poll.upgrade() {
            poll.unsubscribe(self.id);
        }
    }
}
