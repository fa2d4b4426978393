use std::sync::atomic::{AtomicU64, Ordering};

/// Count of request attempts issued for one API version, retries included.
#[derive(Debug, Default)]
pub struct QueryMetric {
    attempts: AtomicU64,
}

impl QueryMetric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one attempt and returns the new total.
    pub fn record_attempt(&self) -> u64 {
        self.attempts.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}
