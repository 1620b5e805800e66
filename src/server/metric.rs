//! Per-request timing (§3 `metric` field) and the optional aggregated sink
//! (§5's "optional aggregated metrics" collaborator).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// First-byte/last-byte timestamps, elapsed time, and bytes consumed for one
/// parsed request.
///
/// Open Question 1: the reference this was distilled from computed
/// `elapsed = start - stop` (negative, a bug). [`Metric::finish`] computes
/// `stop - start`.
#[derive(Debug, Clone, Copy)]
pub struct Metric {
    start: Instant,
    first_byte: Option<Instant>,
    last_byte: Option<Instant>,
    elapsed: Duration,
    bytes: usize,
}

impl Metric {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            first_byte: None,
            last_byte: None,
            elapsed: Duration::ZERO,
            bytes: 0,
        }
    }

    /// Records that a byte has just arrived for the first time this message.
    /// Idempotent — later calls have no effect.
    pub fn mark_first_byte(&mut self) {
        if self.first_byte.is_none() {
            self.first_byte = Some(Instant::now());
        }
    }

    pub fn add_bytes(&mut self, n: usize) {
        self.bytes += n;
        self.last_byte = Some(Instant::now());
    }

    /// Stamps `elapsed` as `now - start`. Call once, when the request is
    /// fully parsed.
    pub fn finish(&mut self) {
        self.elapsed = Instant::now().saturating_duration_since(self.start);
    }

    pub fn first_byte_at(&self) -> Option<Instant> {
        self.first_byte
    }

    pub fn last_byte_at(&self) -> Option<Instant> {
        self.last_byte
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

/// Process-wide aggregated counters, updated under atomics so they tolerate
/// concurrent updates from every session (§5's shared-resource policy).
#[derive(Debug, Default)]
pub struct MetricsSink {
    requests_served: AtomicU64,
    bytes_total: AtomicU64,
    elapsed_nanos_total: AtomicU64,
}

impl MetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, metric: &Metric) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.bytes_total.fetch_add(metric.bytes() as u64, Ordering::Relaxed);
        self.elapsed_nanos_total
            .fetch_add(metric.elapsed().as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    pub fn bytes_total(&self) -> u64 {
        self.bytes_total.load(Ordering::Relaxed)
    }

    pub fn elapsed_total(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos_total.load(Ordering::Relaxed))
    }
}

/// The process-wide monotonic session-id counter (§9 "Global state").
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_session_id() -> u64 {
    NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_nonnegative() {
        let mut m = Metric::start();
        m.finish();
        assert!(m.elapsed() >= Duration::ZERO);
    }

    #[test]
    fn session_ids_are_monotonic_and_distinct() {
        let a = next_session_id();
        let b = next_session_id();
        assert!(b > a);
    }

    #[test]
    fn sink_aggregates_across_records() {
        let sink = MetricsSink::new();
        let mut m1 = Metric::start();
        m1.add_bytes(10);
        m1.finish();
        let mut m2 = Metric::start();
        m2.add_bytes(5);
        m2.finish();
        sink.record(&m1);
        sink.record(&m2);
        assert_eq!(sink.requests_served(), 2);
        assert_eq!(sink.bytes_total(), 15);
    }
}
