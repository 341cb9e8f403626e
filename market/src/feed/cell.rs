use std::sync::Arc;

use corelib::OrderBookSnapshot;
use parking_lot::RwLock;
use tokio::sync::Notify;

/// Holder of the single latest snapshot.
///
/// Publishing swaps a whole `Arc`, so a reader sees either the previous
/// snapshot or the new one. The write lock is held only for the pointer swap;
/// readers clone the `Arc` and release the lock immediately.
#[derive(Default)]
pub(crate) struct SnapshotCell {
    latest: RwLock<Option<Arc<OrderBookSnapshot>>>,
    published: Notify,
}

impl SnapshotCell {
    pub fn publish(&self, snapshot: OrderBookSnapshot) {
        let next = Arc::new(snapshot);
        *self.latest.write() = Some(next);
        self.published.notify_waiters();
    }

    pub fn latest(&self) -> Option<Arc<OrderBookSnapshot>> {
        self.latest.read().clone()
    }

    /// Resolve once a snapshot exists, returning immediately if one already does.
    pub async fn wait(&self) -> Arc<OrderBookSnapshot> {
        loop {
            let notified = self.published.notified();
            tokio::pin!(notified);
            // Register before checking so a publish in between is not missed.
            notified.as_mut().enable();

            if let Some(snapshot) = self.latest() {
                return snapshot;
            }

            notified.await;
        }
    }
}
