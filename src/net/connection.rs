//! In-flight request tracking.
//!
//! # Responsibilities
//! - Count requests currently inside the handler
//! - Give each tracked request a short id for log correlation
//! - Let shutdown wait until the count drops to zero
//!
//! # Design Decisions
//! - Counting is a guard: dropped on every exit path, including panics
//! - Relaxed ordering for id allocation, SeqCst for the active count

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

/// Global atomic counter for request ids.
static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Sequential id of an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestSeq(u64);

impl RequestSeq {
    /// Allocate the next id.
    pub fn next() -> Self {
        Self(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Tracks requests that are being handled.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    active_count: Arc<AtomicU64>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new in-flight request. The guard decrements on drop.
    pub fn track(&self) -> InFlightGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            active_count: Arc::clone(&self.active_count),
            seq: RequestSeq::next(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Wait until no request is in flight, or `deadline` passes.
    ///
    /// Returns `true` if the tracker drained in time.
    pub async fn wait_idle_until(&self, deadline: Instant) -> bool {
        let drained = async {
            while self.active_count() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout_at(deadline, drained).await.is_ok()
    }
}

/// Guard held for the lifetime of one request.
#[derive(Debug)]
pub struct InFlightGuard {
    active_count: Arc<AtomicU64>,
    seq: RequestSeq,
}

impl InFlightGuard {
    pub fn seq(&self) -> RequestSeq {
        self.seq
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(request = %self.seq, "Request finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_unique() {
        assert_ne!(RequestSeq::next(), RequestSeq::next());
    }

    #[test]
    fn tracker_counts() {
        let tracker = InFlightTracker::new();
        assert_eq!(tracker.active_count(), 0);

        let guard1 = tracker.track();
        let guard2 = tracker.track();
        assert_eq!(tracker.active_count(), 2);
        assert_ne!(guard1.seq(), guard2.seq());

        drop(guard1);
        assert_eq!(tracker.active_count(), 1);
        drop(guard2);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn wait_idle_times_out_while_busy() {
        let tracker = InFlightTracker::new();
        let guard = tracker.track();
        let deadline = Instant::now() + Duration::from_millis(30);
        assert!(!tracker.wait_idle_until(deadline).await);
        assert!(Instant::now() >= deadline);

        let waiter = tracker.clone();
        let handle = tokio::spawn(async move {
            waiter
                .wait_idle_until(Instant::now() + Duration::from_secs(5))
                .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);
        assert!(handle.await.unwrap());
    }
}
