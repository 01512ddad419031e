use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for forwarded and silently dropped frames. Observing them never
/// changes what goes over the wire.
#[derive(Debug, Default)]
pub struct RelayStats {
    forwarded: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayStatsSnapshot {
    pub forwarded: u64,
    pub dropped: u64,
}

impl RelayStats {
    pub(crate) fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            forwarded: self.forwarded.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
