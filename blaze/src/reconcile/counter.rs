//! Per-process webhook counter used as correlation identifier

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out monotonically increasing hook ids, starting at 1
#[derive(Debug, Default)]
pub struct HookCounter {
    count: AtomicU64,
}

impl HookCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next hook id
    pub fn next_id(&self) -> u64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of hooks received so far
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}
