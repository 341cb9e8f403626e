use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Default)]
pub(crate) struct FeedCounters {
    pub published: AtomicU64,
    pub discarded: AtomicU64,
    pub connects: AtomicU64,
    pub disconnects: AtomicU64,
}

impl FeedCounters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats {
            published: self.published.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            connects: self.connects.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the feed counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Snapshots that replaced the latest value.
    pub published: u64,
    /// Messages dropped as malformed.
    pub discarded: u64,
    pub connects: u64,
    pub disconnects: u64,
}
