//! Integration tests for publisher dispatch semantics

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use visitor_watch::domain::{VisitorId, VisitorRecord};
use visitor_watch::io::{NoticeKind, RecordingPresenter};
use visitor_watch::services::{
    Attach, NotifyError, Publisher, SecurityStaffSubscriber, Subscriber, SubscriptionHandle,
};

type Log = Arc<Mutex<Vec<String>>>;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, hour, minute, 0).unwrap()
}

fn visitor(id: u32, poc: u32) -> VisitorRecord {
    VisitorRecord::arrival(id, "Visitor", "Meeting", poc, at(9, 0))
}

/// Records every callback as "<name>:<event>:<visitor>"
struct Probe {
    name: &'static str,
    log: Log,
    fail_on_notify: bool,
}

impl Probe {
    fn new(name: &'static str, log: &Log) -> Arc<Self> {
        Arc::new(Self { name, log: log.clone(), fail_on_notify: false })
    }

    fn failing(name: &'static str, log: &Log) -> Arc<Self> {
        Arc::new(Self { name, log: log.clone(), fail_on_notify: true })
    }
}

impl Subscriber for Probe {
    fn on_notify(&self, record: &VisitorRecord) -> Result<(), NotifyError> {
        self.log.lock().push(format!("{}:notify:{}", self.name, record.visitor_id));
        if self.fail_on_notify {
            return Err(NotifyError::Rejected { reason: format!("{} refused", self.name) });
        }
        Ok(())
    }

    fn on_error(&self, error: &NotifyError) {
        self.log.lock().push(format!("{}:error:{}", self.name, error.as_label()));
    }

    fn on_complete(&self) -> Result<(), NotifyError> {
        self.log.lock().push(format!("{}:complete", self.name));
        Ok(())
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Releases its own handle during its first notification
struct SelfRemoving {
    handle: Mutex<Option<SubscriptionHandle>>,
    log: Log,
}

impl Subscriber for SelfRemoving {
    fn on_notify(&self, record: &VisitorRecord) -> Result<(), NotifyError> {
        self.log.lock().push(format!("self:notify:{}", record.visitor_id));
        if let Some(handle) = self.handle.lock().take() {
            handle.release();
        }
        Ok(())
    }

    fn on_error(&self, _error: &NotifyError) {}

    fn on_complete(&self) -> Result<(), NotifyError> {
        self.log.lock().push("self:complete".to_string());
        Ok(())
    }
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

#[test]
fn test_registration_order_is_dispatch_order() {
    let log = Log::default();
    let publisher = Publisher::new();
    let _h1 = publisher.subscribe(Probe::new("s1", &log));
    let _h2 = publisher.subscribe(Probe::new("s2", &log));
    let _h3 = publisher.subscribe(Probe::new("s3", &log));

    publisher.record_entry(visitor(1, 1)).unwrap();

    assert_eq!(entries(&log), vec!["s1:notify:1", "s2:notify:1", "s3:notify:1"]);
}

#[test]
fn test_entry_then_exit_for_security_subscriber() {
    let publisher = Publisher::new();
    let presenter = Arc::new(RecordingPresenter::new());
    let security = SecurityStaffSubscriber::new("Security", presenter.clone());
    security.subscribe(&publisher);

    publisher.record_entry(visitor(10, 1)).unwrap();
    assert!(security.cached()[0].in_building());
    assert!(security.cached()[0].exit_time().is_none());

    publisher.record_exit(VisitorId(10), at(12, 0)).unwrap();

    let kinds: Vec<NoticeKind> = presenter.notices().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NoticeKind::Arrival, NoticeKind::Departure]);
    assert!(presenter.notices().iter().all(|n| n.visitor_id == VisitorId(10)));

    let cached = &security.cached()[0];
    assert!(!cached.in_building());
    assert_eq!(cached.exit_time(), Some(at(12, 0)));
}

#[test]
fn test_exit_updates_tracked_record_in_place() {
    let publisher = Publisher::new();
    publisher.record_entry(visitor(10, 1)).unwrap();
    publisher.record_exit(VisitorId(10), at(12, 0)).unwrap();

    let visitors = publisher.visitors();
    assert_eq!(visitors.len(), 1);
    assert!(!visitors[0].in_building());
    assert_eq!(visitors[0].exit_time(), Some(at(12, 0)));
    assert!(publisher.in_building().is_empty());
}

#[test]
fn test_unknown_exit_is_noop() {
    let log = Log::default();
    let publisher = Publisher::new();
    let _h = publisher.subscribe(Probe::new("s1", &log));
    publisher.record_entry(visitor(1, 1)).unwrap();
    log.lock().clear();

    publisher.record_exit(VisitorId(999), at(10, 0)).unwrap();

    assert!(entries(&log).is_empty());
    assert!(publisher.visitor(VisitorId(999)).is_none());
    assert!(publisher.visitor(VisitorId(1)).unwrap().in_building());
    assert_eq!(publisher.metrics().unknown_exits_total(), 1);
    assert_eq!(publisher.metrics().exits_total(), 0);
}

#[test]
fn test_duplicate_entry_suppressed() {
    let log = Log::default();
    let publisher = Publisher::new();
    let _h = publisher.subscribe(Probe::new("s1", &log));

    let record = visitor(7, 1);
    publisher.record_entry(record.clone()).unwrap();
    publisher.record_entry(record).unwrap();

    assert_eq!(entries(&log), vec!["s1:notify:7"]);
    assert_eq!(publisher.visitors().len(), 1);
    assert_eq!(publisher.metrics().duplicate_entries_total(), 1);
}

#[test]
fn test_duplicate_id_with_different_details_suppressed() {
    let publisher = Publisher::new();
    publisher.record_entry(visitor(7, 1)).unwrap();
    publisher.record_entry(VisitorRecord::arrival(7, "Someone else", "Other", 2, at(10, 0))).unwrap();

    let stored = publisher.visitor(VisitorId(7)).unwrap();
    assert_eq!(stored.visitor_name, "Visitor");
    assert_eq!(publisher.visitors().len(), 1);
}

#[test]
fn test_idempotent_unsubscribe() {
    let publisher = Publisher::new();
    let presenter = Arc::new(RecordingPresenter::new());
    let first = SecurityStaffSubscriber::new("First", presenter.clone());
    let second = SecurityStaffSubscriber::new("Second", presenter.clone());
    first.subscribe(&publisher);
    second.subscribe(&publisher);

    first.unsubscribe();
    assert_eq!(publisher.subscriber_count(), 1);

    first.unsubscribe();
    assert_eq!(publisher.subscriber_count(), 1);
    assert!(second.is_attached());
}

#[test]
fn test_end_period_fans_out_once_in_order() {
    let log = Log::default();
    let publisher = Publisher::new();
    let _h1 = publisher.subscribe(Probe::new("s1", &log));
    let _h2 = publisher.subscribe(Probe::new("s2", &log));

    for id in 1..=5 {
        publisher.record_entry(visitor(id, 1)).unwrap();
    }
    publisher.record_exit(VisitorId(3), at(11, 0)).unwrap();
    log.lock().clear();

    publisher.end_period().unwrap();

    assert_eq!(entries(&log), vec!["s1:complete", "s2:complete"]);
    // Completion does not reset publisher state
    assert_eq!(publisher.subscriber_count(), 2);
    assert_eq!(publisher.visitors().len(), 5);
}

#[test]
fn test_subscriber_failure_stops_fanout_and_propagates() {
    let log = Log::default();
    let publisher = Publisher::new();
    let _h1 = publisher.subscribe(Probe::new("s1", &log));
    let _h2 = publisher.subscribe(Probe::failing("s2", &log));
    let _h3 = publisher.subscribe(Probe::new("s3", &log));

    let err = publisher.record_entry(visitor(1, 1)).unwrap_err();

    assert_eq!(err, NotifyError::Rejected { reason: "s2 refused".to_string() });
    assert_eq!(entries(&log), vec!["s1:notify:1", "s2:notify:1"]);
    // State change made before the fan-out stays in place
    assert!(publisher.visitor(VisitorId(1)).is_some());
    assert_eq!(publisher.metrics().subscriber_failures_total(), 1);
}

#[test]
fn test_publisher_never_calls_on_error() {
    let log = Log::default();
    let publisher = Publisher::new();
    let probe = Probe::new("s1", &log);
    let _h = publisher.subscribe(probe.clone());

    publisher.record_entry(visitor(1, 1)).unwrap();
    publisher.record_exit(VisitorId(1), at(10, 0)).unwrap();
    publisher.record_exit(VisitorId(2), at(10, 0)).unwrap();
    publisher.end_period().unwrap();
    assert!(entries(&log).iter().all(|e| !e.contains(":error:")));

    // Surrounding code may signal manually
    probe.on_error(&NotifyError::Rejected { reason: "badge".to_string() });
    assert_eq!(entries(&log).last().unwrap(), "s1:error:notify_rejected");
}

#[test]
fn test_unsubscribe_during_callback_keeps_fanout_stable() {
    let log = Log::default();
    let publisher = Publisher::new();
    let _h1 = publisher.subscribe(Probe::new("s1", &log));
    let remover = Arc::new(SelfRemoving { handle: Mutex::new(None), log: log.clone() });
    let handle = publisher.subscribe(remover.clone());
    *remover.handle.lock() = Some(handle);
    let _h3 = publisher.subscribe(Probe::new("s3", &log));

    publisher.record_entry(visitor(1, 1)).unwrap();
    assert_eq!(entries(&log), vec!["s1:notify:1", "self:notify:1", "s3:notify:1"]);
    assert_eq!(publisher.subscriber_count(), 2);

    log.lock().clear();
    publisher.record_entry(visitor(2, 1)).unwrap();
    assert_eq!(entries(&log), vec!["s1:notify:2", "s3:notify:2"]);
}

#[test]
fn test_same_subscriber_registered_twice_receives_twice() {
    let log = Log::default();
    let publisher = Publisher::new();
    let probe = Probe::new("s1", &log);
    let first = publisher.subscribe(probe.clone());
    let _second = publisher.subscribe(probe);

    publisher.record_entry(visitor(1, 1)).unwrap();
    assert_eq!(entries(&log), vec!["s1:notify:1", "s1:notify:1"]);

    first.release();
    log.lock().clear();
    publisher.record_entry(visitor(2, 1)).unwrap();
    assert_eq!(entries(&log), vec!["s1:notify:2"]);
}

#[test]
fn test_handle_release_after_publisher_dropped() {
    let log = Log::default();
    let publisher = Publisher::new();
    let handle = publisher.subscribe(Probe::new("s1", &log));
    drop(publisher);

    assert!(!handle.release());
    assert!(!handle.release());
}
