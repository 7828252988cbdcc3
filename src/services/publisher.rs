//! Visitor publisher: authoritative visit state plus synchronous fan-out
//!
//! The Publisher is the single source of truth for a tracking period. Every
//! state change produces one undifferentiated notification, delivered to each
//! registered subscriber in registration order:
//!
//! ```text
//! record_entry(rec) ──► table.insert_new ──┐
//! record_exit(id, t) ─► table.mark_exited ─┼─► snapshot(subscribers) ──► S1.on_notify
//!                                          │                          ──► S2.on_notify
//! end_period() ────────────────────────────┘                          ──► SN.on_complete
//! ```
//!
//! Neither lock is held while a callback runs: the subscriber list is
//! snapshotted and the dispatched record is a copy of the table entry.

use crate::domain::{VisitorId, VisitorRecord};
use crate::infra::metrics::Metrics;
use crate::services::error::NotifyError;
use crate::services::subscriber::Subscriber;
use crate::services::subscription::{SubscriberSet, SubscriptionHandle};
use crate::services::visitor_cache::VisitorTable;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Observable registry and dispatcher for visitor notifications
pub struct Publisher {
    /// UUIDv7 tag for this tracking period (logging only)
    period_id: String,
    /// Registered subscribers in dispatch order
    subscribers: SubscriberSet,
    /// Visit state for the current period
    visitors: Mutex<VisitorTable>,
    /// Metrics collector
    metrics: Arc<Metrics>,
}

impl Publisher {
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(Metrics::new()))
    }

    pub fn with_metrics(metrics: Arc<Metrics>) -> Self {
        let period_id = Uuid::now_v7().to_string();
        info!(period_id = %period_id, "tracking_period_started");
        Self {
            period_id,
            subscribers: SubscriberSet::new(),
            visitors: Mutex::new(VisitorTable::new()),
            metrics,
        }
    }

    /// Register a subscriber. Duplicates are allowed; each call returns its
    /// own handle.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> SubscriptionHandle {
        let handle = self.subscribers.insert(subscriber);
        self.metrics.record_subscription();
        handle
    }

    /// Track a new visitor and notify every subscriber.
    ///
    /// A record whose visitor id is already tracked is ignored.
    pub fn record_entry(&self, record: VisitorRecord) -> Result<(), NotifyError> {
        let visitor_id = record.visitor_id;
        let dispatched = record.clone();

        if !self.visitors.lock().insert_new(record) {
            self.metrics.record_duplicate_entry();
            debug!(period_id = %self.period_id, visitor_id = %visitor_id, "duplicate_entry_ignored");
            return Ok(());
        }
        self.metrics.record_entry();

        info!(
            period_id = %self.period_id,
            visitor_id = %visitor_id,
            poc_id = %dispatched.poc_id,
            "visitor_entry_recorded"
        );

        self.fan_out(&dispatched)
    }

    /// Mark a tracked visitor as exited and notify every subscriber with the
    /// updated record. Unknown ids are ignored.
    pub fn record_exit(
        &self,
        visitor_id: VisitorId,
        exit_time: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        let updated = {
            let mut visitors = self.visitors.lock();
            let Some(record) = visitors.get_mut(visitor_id) else {
                self.metrics.record_unknown_exit();
                debug!(period_id = %self.period_id, visitor_id = %visitor_id, "unknown_exit_ignored");
                return Ok(());
            };
            record.mark_exited(exit_time);
            record.clone()
        };
        self.metrics.record_exit();

        info!(
            period_id = %self.period_id,
            visitor_id = %visitor_id,
            exit_time = %exit_time,
            "visitor_exit_recorded"
        );

        self.fan_out(&updated)
    }

    /// Signal end of period to every subscriber.
    ///
    /// Leaves the subscriber set and visitor table as they are.
    pub fn end_period(&self) -> Result<(), NotifyError> {
        let subscribers = self.subscribers.snapshot();
        info!(
            period_id = %self.period_id,
            subscribers = %subscribers.len(),
            visitors = %self.visitors.lock().len(),
            "tracking_period_ending"
        );

        for subscriber in subscribers {
            if let Err(e) = subscriber.on_complete() {
                self.metrics.record_subscriber_failure();
                warn!(
                    period_id = %self.period_id,
                    subscriber = %subscriber.name(),
                    error = %e,
                    label = %e.as_label(),
                    "subscriber_complete_failed"
                );
                return Err(e);
            }
            self.metrics.record_completion();
        }
        Ok(())
    }

    fn fan_out(&self, record: &VisitorRecord) -> Result<(), NotifyError> {
        let start = Instant::now();
        let subscribers = self.subscribers.snapshot();

        for subscriber in &subscribers {
            if let Err(e) = subscriber.on_notify(record) {
                self.metrics.record_subscriber_failure();
                warn!(
                    period_id = %self.period_id,
                    subscriber = %subscriber.name(),
                    visitor_id = %record.visitor_id,
                    error = %e,
                    label = %e.as_label(),
                    "subscriber_notify_failed"
                );
                return Err(e);
            }
            self.metrics.record_notification();
        }

        self.metrics.record_fanout(start.elapsed().as_micros() as u64);
        debug!(
            visitor_id = %record.visitor_id,
            subscribers = %subscribers.len(),
            "fanout_complete"
        );
        Ok(())
    }

    pub fn period_id(&self) -> &str {
        &self.period_id
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Current state of one tracked visitor
    pub fn visitor(&self, visitor_id: VisitorId) -> Option<VisitorRecord> {
        self.visitors.lock().get(visitor_id).cloned()
    }

    /// All tracked visitors in entry order
    pub fn visitors(&self) -> Vec<VisitorRecord> {
        self.visitors.lock().records().to_vec()
    }

    /// Tracked visitors that have not exited yet
    pub fn in_building(&self) -> Vec<VisitorRecord> {
        self.visitors.lock().records().iter().filter(|r| r.in_building()).cloned().collect()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}
