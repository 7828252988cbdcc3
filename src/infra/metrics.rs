//! Lock-free counters for publisher activity
//!
//! Uses atomics so recording never contends with dispatch.
//! Reporting swaps the per-report fan-out counters to zero; totals are
//! monotonic.
//!
//! NOTE: All atomics use Relaxed ordering: these are statistical
//! counters only. Do NOT use these atomics for coordination or logic decisions.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Fan-out latency bucket boundaries (microseconds)
/// Buckets: ≤10, ≤20, ≤40, ≤80, ≤160, ≤320, ≤640, ≤1280, ≤2560, ≤5120, >5120
const BUCKET_BOUNDS: [u64; 10] = [10, 20, 40, 80, 160, 320, 640, 1280, 2560, 5120];
const NUM_BUCKETS: usize = 11;

/// Compute bucket index for a latency value using binary search
#[inline]
fn bucket_index(latency_us: u64) -> usize {
    BUCKET_BOUNDS.partition_point(|&bound| bound < latency_us)
}

/// Update an atomic max value using compare-and-swap loop
#[inline]
fn update_atomic_max(atomic_max: &AtomicU64, new_value: u64) {
    let mut current_max = atomic_max.load(Ordering::Relaxed);
    while new_value > current_max {
        match atomic_max.compare_exchange_weak(
            current_max,
            new_value,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(actual) => current_max = actual,
        }
    }
}

/// Swap all buckets to zero and return their values
#[inline]
fn swap_buckets(buckets: &[AtomicU64; NUM_BUCKETS]) -> [u64; NUM_BUCKETS] {
    let mut result = [0u64; NUM_BUCKETS];
    for (i, bucket) in buckets.iter().enumerate() {
        result[i] = bucket.swap(0, Ordering::Relaxed);
    }
    result
}

/// Upper bound of the bucket containing the percentile
fn percentile_from_buckets(buckets: &[u64; NUM_BUCKETS], percentile: f64) -> u64 {
    let total: u64 = buckets.iter().sum();
    if total == 0 {
        return 0;
    }

    let target = ((total as f64 * percentile).ceil() as u64).max(1);
    let mut cumulative = 0u64;

    // Last bucket uses 2x the previous bound
    const BUCKET_UPPER_BOUNDS: [u64; NUM_BUCKETS] =
        [10, 20, 40, 80, 160, 320, 640, 1280, 2560, 5120, 10240];

    for (i, &count) in buckets.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return BUCKET_UPPER_BOUNDS[i];
        }
    }
    BUCKET_UPPER_BOUNDS[NUM_BUCKETS - 1]
}

/// Lock-free metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Entries accepted into the visitor table (monotonic)
    entries_total: AtomicU64,
    /// Entries ignored because the id was already tracked (monotonic)
    duplicate_entries_total: AtomicU64,
    /// Exits applied to a tracked record (monotonic)
    exits_total: AtomicU64,
    /// Exits for an id the publisher never saw (monotonic)
    unknown_exits_total: AtomicU64,
    /// Successful on_notify callbacks (monotonic)
    notifications_total: AtomicU64,
    /// Successful on_complete callbacks (monotonic)
    completions_total: AtomicU64,
    /// Callbacks that returned an error (monotonic)
    subscriber_failures_total: AtomicU64,
    /// Registrations made (monotonic)
    subscriptions_total: AtomicU64,
    /// Fan-outs since last report (reset on report)
    fanouts_since_report: AtomicU64,
    /// Sum of fan-out latencies in microseconds (reset on report)
    fanout_sum_us: AtomicU64,
    /// Max fan-out latency in microseconds (reset on report)
    fanout_max_us: AtomicU64,
    /// Fan-out latency histogram (reset on report)
    fanout_buckets: [AtomicU64; NUM_BUCKETS],
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            entries_total: AtomicU64::new(0),
            duplicate_entries_total: AtomicU64::new(0),
            exits_total: AtomicU64::new(0),
            unknown_exits_total: AtomicU64::new(0),
            notifications_total: AtomicU64::new(0),
            completions_total: AtomicU64::new(0),
            subscriber_failures_total: AtomicU64::new(0),
            subscriptions_total: AtomicU64::new(0),
            fanouts_since_report: AtomicU64::new(0),
            fanout_sum_us: AtomicU64::new(0),
            fanout_max_us: AtomicU64::new(0),
            fanout_buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn record_entry(&self) {
        self.entries_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_duplicate_entry(&self) {
        self.duplicate_entries_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_exit(&self) {
        self.exits_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unknown_exit(&self) {
        self.unknown_exits_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_notification(&self) {
        self.notifications_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_completion(&self) {
        self.completions_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_subscriber_failure(&self) {
        self.subscriber_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_subscription(&self) {
        self.subscriptions_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the wall time of one complete fan-out
    #[inline]
    pub fn record_fanout(&self, latency_us: u64) {
        self.fanouts_since_report.fetch_add(1, Ordering::Relaxed);
        self.fanout_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        update_atomic_max(&self.fanout_max_us, latency_us);
        self.fanout_buckets[bucket_index(latency_us)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn entries_total(&self) -> u64 {
        self.entries_total.load(Ordering::Relaxed)
    }

    pub fn duplicate_entries_total(&self) -> u64 {
        self.duplicate_entries_total.load(Ordering::Relaxed)
    }

    pub fn exits_total(&self) -> u64 {
        self.exits_total.load(Ordering::Relaxed)
    }

    pub fn unknown_exits_total(&self) -> u64 {
        self.unknown_exits_total.load(Ordering::Relaxed)
    }

    pub fn notifications_total(&self) -> u64 {
        self.notifications_total.load(Ordering::Relaxed)
    }

    pub fn completions_total(&self) -> u64 {
        self.completions_total.load(Ordering::Relaxed)
    }

    pub fn subscriber_failures_total(&self) -> u64 {
        self.subscriber_failures_total.load(Ordering::Relaxed)
    }

    /// Snapshot totals and drain the fan-out latency window
    pub fn report(&self, tracked_visitors: usize, in_building: usize) -> MetricsSummary {
        let fanouts = self.fanouts_since_report.swap(0, Ordering::Relaxed);
        let fanout_sum = self.fanout_sum_us.swap(0, Ordering::Relaxed);
        let fanout_max = self.fanout_max_us.swap(0, Ordering::Relaxed);
        let buckets = swap_buckets(&self.fanout_buckets);

        let avg_fanout_us = if fanouts > 0 { fanout_sum / fanouts } else { 0 };

        MetricsSummary {
            entries_total: self.entries_total(),
            duplicate_entries_total: self.duplicate_entries_total(),
            exits_total: self.exits_total(),
            unknown_exits_total: self.unknown_exits_total(),
            notifications_total: self.notifications_total(),
            completions_total: self.completions_total(),
            subscriber_failures_total: self.subscriber_failures_total(),
            subscriptions_total: self.subscriptions_total.load(Ordering::Relaxed),
            fanouts,
            avg_fanout_us,
            max_fanout_us: fanout_max,
            fanout_p50_us: percentile_from_buckets(&buckets, 0.50),
            fanout_p99_us: percentile_from_buckets(&buckets, 0.99),
            tracked_visitors,
            in_building,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of [`Metrics`]
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub entries_total: u64,
    pub duplicate_entries_total: u64,
    pub exits_total: u64,
    pub unknown_exits_total: u64,
    pub notifications_total: u64,
    pub completions_total: u64,
    pub subscriber_failures_total: u64,
    pub subscriptions_total: u64,
    pub fanouts: u64,
    pub avg_fanout_us: u64,
    pub max_fanout_us: u64,
    pub fanout_p50_us: u64,
    pub fanout_p99_us: u64,
    pub tracked_visitors: usize,
    pub in_building: usize,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            entries = %self.entries_total,
            duplicate_entries = %self.duplicate_entries_total,
            exits = %self.exits_total,
            unknown_exits = %self.unknown_exits_total,
            notifications = %self.notifications_total,
            completions = %self.completions_total,
            subscriber_failures = %self.subscriber_failures_total,
            subscriptions = %self.subscriptions_total,
            fanouts = %self.fanouts,
            avg_fanout_us = %self.avg_fanout_us,
            max_fanout_us = %self.max_fanout_us,
            fanout_p99_us = %self.fanout_p99_us,
            tracked_visitors = %self.tracked_visitors,
            in_building = %self.in_building,
            "metrics"
        );
    }
}
