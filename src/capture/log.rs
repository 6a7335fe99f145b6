//! Append-only log of captured requests.
//!
//! # Design Decisions
//! - A mutex around a `Vec`; the critical section is one push or one clone
//!   of the pointer list, never I/O
//! - Records are stored behind `Arc`, so a snapshot copies pointers only
//! - A poisoned lock is recovered: appends never fail

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::capture::record::CapturedRequest;

/// Ordered, thread-safe log of every request that reached the dispatcher.
///
/// Order is arrival order at the dispatcher, which may differ from the order
/// in which racing clients sent their requests.
#[derive(Debug, Default)]
pub struct CaptureLog {
    records: Mutex<Vec<Arc<CapturedRequest>>>,
}

impl CaptureLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return the shared handle to it.
    pub fn append(&self, record: CapturedRequest) -> Arc<CapturedRequest> {
        let record = Arc::new(record);
        self.lock().push(Arc::clone(&record));
        crate::observability::metrics::record_capture();
        record
    }

    /// Independent copy of all records appended so far, oldest first.
    pub fn snapshot(&self) -> Vec<Arc<CapturedRequest>> {
        self.lock().clone()
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<CapturedRequest>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method};
    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;

    /// Keeps counters by name; gauges and histograms are dropped.
    #[derive(Default)]
    struct Counters(Mutex<HashMap<String, Arc<AtomicU64>>>);

    impl Counters {
        fn get(&self, name: &str) -> u64 {
            self.0
                .lock()
                .unwrap()
                .get(name)
                .map_or(0, |c| c.load(Ordering::SeqCst))
        }
    }

    impl Recorder for Counters {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let mut counters = self.0.lock().unwrap();
            let counter = counters.entry(key.name().to_string()).or_default();
            Counter::from_arc(Arc::clone(counter))
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    fn record(path: &str) -> CapturedRequest {
        CapturedRequest::new(Method::GET, path, HeaderMap::new(), Bytes::new())
    }

    #[test]
    fn preserves_append_order() {
        let log = CaptureLog::new();
        assert!(log.is_empty());
        log.append(record("/a"));
        log.append(record("/b"));
        log.append(record("/c"));

        let paths: Vec<_> = log.snapshot().iter().map(|r| r.path().to_string()).collect();
        assert_eq!(paths, ["/a", "/b", "/c"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn snapshot_is_independent() {
        let log = CaptureLog::new();
        log.append(record("/first"));
        let snapshot = log.snapshot();
        log.append(record("/second"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.snapshot().len(), 2);
    }

    #[test]
    fn append_returns_stored_record() {
        let log = CaptureLog::new();
        let stored = log.append(record("/x"));
        assert!(Arc::ptr_eq(&stored, &log.snapshot()[0]));
    }

    #[test]
    fn capture_metric_counts_across_logs() {
        let recorder = Counters::default();
        metrics::with_local_recorder(&recorder, || {
            let first = CaptureLog::new();
            let second = CaptureLog::new();
            first.append(record("/a"));
            first.append(record("/b"));
            second.append(record("/c"));
            first.append(record("/d"));
        });
        assert_eq!(recorder.get("stub_captured_requests_total"), 4);
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let log = Arc::new(CaptureLog::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..250 {
                        log.append(record(&format!("/{t}/{i}")));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2000);

        // Each thread's own appends keep their relative order.
        for t in 0..8 {
            let prefix = format!("/{t}/");
            let seen: Vec<usize> = snapshot
                .iter()
                .filter_map(|r| r.path().strip_prefix(&prefix).map(|i| i.parse().unwrap()))
                .collect();
            assert_eq!(seen, (0..250).collect::<Vec<_>>());
        }
    }
}
