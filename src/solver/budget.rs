//! Shared search budget.

use super::config::SolverConfig;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Deadline checks are amortized over this many nodes.
const CLOCK_INTERVAL: u64 = 256;

/// Time and node limits shared by every search of one solve.
///
/// Components may be searched on several threads, so counters are atomic.
pub(crate) struct Budget {
    start: Instant,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    pub(crate) stop_after_first: bool,
    nodes: AtomicU64,
    expired: AtomicBool,
}

impl Budget {
    pub(crate) fn new(config: &SolverConfig, start: Instant) -> Self {
        Self {
            start,
            deadline: config
                .time_limit_ms
                .map(|ms| start + Duration::from_millis(ms)),
            node_limit: config.node_limit,
            stop_after_first: config.stop_after_first,
            nodes: AtomicU64::new(0),
            expired: AtomicBool::new(false),
        }
    }

    /// Counts one node; returns `true` while the budget still allows more.
    pub(crate) fn tick(&self) -> bool {
        let visited = self.nodes.fetch_add(1, Ordering::Relaxed) + 1;
        if self.expired.load(Ordering::Relaxed) {
            return false;
        }
        let over_nodes = self.node_limit.is_some_and(|limit| visited > limit);
        let over_time = visited % CLOCK_INTERVAL == 0
            && self.deadline.is_some_and(|d| Instant::now() >= d);
        if over_nodes || over_time {
            self.expired.store(true, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Whether a time or node limit has been hit.
    pub(crate) fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Relaxed)
    }

    pub(crate) fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    pub(crate) fn elapsed_ms(&self) -> i64 {
        i64::try_from(self.start.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}
