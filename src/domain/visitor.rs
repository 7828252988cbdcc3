//! Visitor record data model

use crate::domain::types::{EmployeeId, VisitorId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single visit by an external visitor
///
/// `in_building` and `exit_time` only change together through
/// [`VisitorRecord::mark_exited`], so `in_building` is true exactly while
/// `exit_time` is unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitorRecord {
    pub visitor_id: VisitorId,
    pub visitor_name: String,
    pub purpose: String,
    pub entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    in_building: bool,
    pub poc_id: EmployeeId,
}

impl VisitorRecord {
    /// Create a record for a visitor arriving at `entry_time`.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Utc;
    /// use visitor_watch::domain::VisitorRecord;
    ///
    /// let record = VisitorRecord::arrival(10, "Sam Ortiz", "Interview", 1, Utc::now());
    /// assert!(record.in_building());
    /// assert!(record.exit_time().is_none());
    /// ```
    pub fn arrival(
        visitor_id: u32,
        visitor_name: &str,
        purpose: &str,
        poc_id: u32,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            visitor_id: VisitorId(visitor_id),
            visitor_name: visitor_name.to_string(),
            purpose: purpose.to_string(),
            entry_time,
            exit_time: None,
            in_building: true,
            poc_id: EmployeeId(poc_id),
        }
    }

    /// Record the exit. Overwrites a previous exit time if one was set.
    pub fn mark_exited(&mut self, exit_time: DateTime<Utc>) {
        self.exit_time = Some(exit_time);
        self.in_building = false;
    }

    #[inline]
    pub fn in_building(&self) -> bool {
        self.in_building
    }

    #[inline]
    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.exit_time
    }

    /// Time spent in the building, once exited
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.exit_time.map(|exit| exit - self.entry_time)
    }
}
