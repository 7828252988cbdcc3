//! Point-of-contact subscriber
//!
//! Bound to one employee. Every notification reaches it, but only visitors
//! whose `poc_id` matches the employee are cached and reported.

use crate::domain::{Employee, VisitorRecord};
use crate::io::{Notice, PeriodReport, Presenter};
use crate::services::error::NotifyError;
use crate::services::subscriber::{Attach, Subscriber, SubscriptionSlot};
use crate::services::visitor_cache::{Transition, VisitorCache};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Inner {
    employee: Employee,
    cache: Mutex<VisitorCache>,
    presenter: Arc<dyn Presenter>,
    slot: SubscriptionSlot,
}

/// Subscriber for the employee responsible for a set of visitors
///
/// Cloning yields another handle to the same subscriber.
#[derive(Clone)]
pub struct PointOfContactSubscriber {
    inner: Arc<Inner>,
}

impl PointOfContactSubscriber {
    pub fn new(employee: Employee, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                employee,
                cache: Mutex::new(VisitorCache::new()),
                presenter,
                slot: SubscriptionSlot::new(),
            }),
        }
    }

    pub fn employee(&self) -> &Employee {
        &self.inner.employee
    }

    /// Visitors this employee is currently responsible for, in arrival order
    pub fn cached(&self) -> Vec<VisitorRecord> {
        self.inner.cache.lock().records().to_vec()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.slot.is_attached()
    }

    fn is_relevant(&self, record: &VisitorRecord) -> bool {
        record.poc_id == self.inner.employee.id
    }

    /// Report over cached visitors belonging to this employee
    pub fn period_report(&self) -> PeriodReport {
        let cache = self.inner.cache.lock();
        PeriodReport::new(&self.inner.employee.name, cache.records_for(self.inner.employee.id))
    }
}

impl Subscriber for PointOfContactSubscriber {
    fn on_notify(&self, record: &VisitorRecord) -> Result<(), NotifyError> {
        if !self.is_relevant(record) {
            debug!(
                employee_id = %self.inner.employee.id,
                visitor_id = %record.visitor_id,
                poc_id = %record.poc_id,
                "notification_ignored"
            );
            return Ok(());
        }

        // Cache lock is released before presenting
        let (transition, notice) = {
            let mut cache = self.inner.cache.lock();
            let transition = cache.observe(record);
            let cached = cache.get(record.visitor_id).unwrap_or(record);
            (transition, Notice::new(&self.inner.employee.name, transition, cached))
        };

        match transition {
            Transition::Entered => info!(
                employee_id = %self.inner.employee.id,
                visitor_id = %notice.visitor_id,
                "visitor_entered"
            ),
            Transition::Exited => info!(
                employee_id = %self.inner.employee.id,
                visitor_id = %notice.visitor_id,
                "visitor_exited"
            ),
        }

        self.inner.presenter.notice(&notice)
    }

    fn on_error(&self, error: &NotifyError) {
        warn!(
            employee_id = %self.inner.employee.id,
            error = %error,
            label = %error.as_label(),
            "poc_subscriber_error"
        );
    }

    fn on_complete(&self) -> Result<(), NotifyError> {
        let report = self.period_report();
        info!(
            employee_id = %self.inner.employee.id,
            visitors = %report.rows.len(),
            still_inside = %report.still_inside(),
            "period_report"
        );
        self.inner.presenter.report(&report)
    }

    fn name(&self) -> &str {
        &self.inner.employee.name
    }
}

impl Attach for PointOfContactSubscriber {
    fn slot(&self) -> &SubscriptionSlot {
        &self.inner.slot
    }

    fn clear_cache(&self) {
        self.inner.cache.lock().clear();
    }
}
