//! Session driver: wires subscribers to a publisher and replays a script
//!
//! One point-of-contact subscriber per roster employee is registered in roster
//! order, followed by the security channel when enabled.

use crate::domain::{VisitorId, VisitorRecord};
use crate::infra::config::{Config, ScriptStep};
use crate::infra::metrics::{Metrics, MetricsSummary};
use crate::io::Presenter;
use crate::services::error::NotifyError;
use crate::services::point_of_contact::PointOfContactSubscriber;
use crate::services::publisher::Publisher;
use crate::services::security_staff::SecurityStaffSubscriber;
use crate::services::subscriber::Attach;
use std::sync::Arc;
use tracing::{info, warn};

/// A tracking period with its subscribers attached
pub struct Session {
    site_id: String,
    publisher: Publisher,
    contacts: Vec<PointOfContactSubscriber>,
    security: Option<SecurityStaffSubscriber>,
}

impl Session {
    pub fn new(config: &Config, presenter: Arc<dyn Presenter>, metrics: Arc<Metrics>) -> Self {
        let publisher = Publisher::with_metrics(metrics);

        let contacts: Vec<PointOfContactSubscriber> = config
            .employees()
            .iter()
            .map(|employee| {
                let contact = PointOfContactSubscriber::new(employee.clone(), presenter.clone());
                contact.subscribe(&publisher);
                contact
            })
            .collect();

        let security = config.security_enabled().then(|| {
            let security = SecurityStaffSubscriber::new(config.security_name(), presenter.clone());
            security.subscribe(&publisher);
            security
        });

        info!(
            site_id = %config.site_id(),
            period_id = %publisher.period_id(),
            contacts = %contacts.len(),
            security = %security.is_some(),
            "session_started"
        );

        Self { site_id: config.site_id().to_string(), publisher, contacts, security }
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn contacts(&self) -> &[PointOfContactSubscriber] {
        &self.contacts
    }

    pub fn security(&self) -> Option<&SecurityStaffSubscriber> {
        self.security.as_ref()
    }

    /// Apply a single script step to the publisher
    pub fn apply(&self, step: &ScriptStep) -> Result<(), NotifyError> {
        match step {
            ScriptStep::Entry { visitor_id, name, purpose, poc_id, at } => {
                if !self.contacts.iter().any(|c| c.employee().id.0 == *poc_id) {
                    warn!(visitor_id = %visitor_id, poc_id = %poc_id, "unknown_point_of_contact");
                }
                let record = VisitorRecord::arrival(*visitor_id, name, purpose, *poc_id, *at);
                self.publisher.record_entry(record)
            }
            ScriptStep::Exit { visitor_id, at } => {
                self.publisher.record_exit(VisitorId(*visitor_id), *at)
            }
        }
    }

    /// Apply steps in order, stopping at the first subscriber failure.
    /// Returns the number of steps applied.
    pub fn replay(&self, steps: &[ScriptStep]) -> Result<usize, NotifyError> {
        for step in steps {
            self.apply(step)?;
        }
        Ok(steps.len())
    }

    /// End the period, detach every subscriber and return final metrics.
    pub fn finish(self) -> Result<MetricsSummary, NotifyError> {
        self.publisher.end_period()?;

        let summary = self
            .publisher
            .metrics()
            .report(self.publisher.visitors().len(), self.publisher.in_building().len());

        for contact in &self.contacts {
            contact.unsubscribe();
        }
        if let Some(security) = &self.security {
            security.unsubscribe();
        }

        info!(
            site_id = %self.site_id,
            period_id = %self.publisher.period_id(),
            remaining_subscribers = %self.publisher.subscriber_count(),
            "session_finished"
        );
        Ok(summary)
    }
}
