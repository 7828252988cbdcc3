//! Security-staff subscriber
//!
//! Sees every visitor regardless of point of contact.

use crate::domain::VisitorRecord;
use crate::io::{Notice, PeriodReport, Presenter};
use crate::services::error::NotifyError;
use crate::services::subscriber::{Attach, Subscriber, SubscriptionSlot};
use crate::services::visitor_cache::{Transition, VisitorCache};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

struct Inner {
    name: String,
    cache: Mutex<VisitorCache>,
    presenter: Arc<dyn Presenter>,
    slot: SubscriptionSlot,
}

/// Building-wide security channel
#[derive(Clone)]
pub struct SecurityStaffSubscriber {
    inner: Arc<Inner>,
}

impl SecurityStaffSubscriber {
    pub fn new(name: &str, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                cache: Mutex::new(VisitorCache::new()),
                presenter,
                slot: SubscriptionSlot::new(),
            }),
        }
    }

    pub fn cached(&self) -> Vec<VisitorRecord> {
        self.inner.cache.lock().records().to_vec()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.slot.is_attached()
    }

    pub fn period_report(&self) -> PeriodReport {
        PeriodReport::new(&self.inner.name, self.inner.cache.lock().records())
    }
}

impl Subscriber for SecurityStaffSubscriber {
    fn on_notify(&self, record: &VisitorRecord) -> Result<(), NotifyError> {
        let (transition, notice) = {
            let mut cache = self.inner.cache.lock();
            let transition = cache.observe(record);
            let cached = cache.get(record.visitor_id).unwrap_or(record);
            (transition, Notice::new(&self.inner.name, transition, cached))
        };

        let event = match transition {
            Transition::Entered => "visitor_entered",
            Transition::Exited => "visitor_exited",
        };
        info!(
            channel = %self.inner.name,
            visitor_id = %notice.visitor_id,
            poc_id = %notice.poc_id,
            transition = %event,
            "security_notice"
        );

        self.inner.presenter.notice(&notice)
    }

    fn on_error(&self, error: &NotifyError) {
        warn!(
            channel = %self.inner.name,
            error = %error,
            label = %error.as_label(),
            "security_subscriber_error"
        );
    }

    fn on_complete(&self) -> Result<(), NotifyError> {
        let report = self.period_report();
        info!(
            channel = %self.inner.name,
            visitors = %report.rows.len(),
            still_inside = %report.still_inside(),
            "period_report"
        );
        self.inner.presenter.report(&report)
    }

    fn name(&self) -> &str {
        &self.inner.name
    }
}

impl Attach for SecurityStaffSubscriber {
    fn slot(&self) -> &SubscriptionSlot {
        &self.inner.slot
    }

    fn clear_cache(&self) {
        self.inner.cache.lock().clear();
    }
}
