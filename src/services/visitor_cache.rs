//! Visitor tables keyed by visitor id
//!
//! [`VisitorTable`] is the id-indexed store used both by the publisher (the
//! authoritative table) and by each subscriber (its private cache).
//! [`VisitorCache`] adds entry-vs-exit inference on top: a record the cache
//! has never seen is an arrival, a record it already holds is a departure.

use crate::domain::{EmployeeId, VisitorId, VisitorRecord};
use rustc_hash::FxHashMap;

/// Insertion-ordered visitor records with O(1) lookup by id
#[derive(Debug, Default, Clone)]
pub struct VisitorTable {
    records: Vec<VisitorRecord>,
    index: FxHashMap<VisitorId, usize>,
}

impl VisitorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` unless its id is already present.
    /// Returns false (and leaves the table untouched) for a duplicate id.
    pub fn insert_new(&mut self, record: VisitorRecord) -> bool {
        if self.index.contains_key(&record.visitor_id) {
            return false;
        }
        self.index.insert(record.visitor_id, self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, visitor_id: VisitorId) -> Option<&VisitorRecord> {
        self.index.get(&visitor_id).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, visitor_id: VisitorId) -> Option<&mut VisitorRecord> {
        self.index.get(&visitor_id).map(|&i| &mut self.records[i])
    }

    pub fn contains(&self, visitor_id: VisitorId) -> bool {
        self.index.contains_key(&visitor_id)
    }

    /// Records in insertion order
    pub fn records(&self) -> &[VisitorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

/// Transition inferred from a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered,
    Exited,
}

/// A subscriber's private view of the visitors it cares about
#[derive(Debug, Default)]
pub struct VisitorCache {
    table: VisitorTable,
}

impl VisitorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a notification and update the cache.
    ///
    /// Unknown id: cache a copy and report `Entered`. Known id: copy the exit
    /// fields onto the cached record and report `Exited`.
    pub fn observe(&mut self, record: &VisitorRecord) -> Transition {
        match self.table.get_mut(record.visitor_id) {
            Some(cached) => {
                if let Some(exit_time) = record.exit_time() {
                    cached.mark_exited(exit_time);
                }
                Transition::Exited
            }
            None => {
                self.table.insert_new(record.clone());
                Transition::Entered
            }
        }
    }

    pub fn get(&self, visitor_id: VisitorId) -> Option<&VisitorRecord> {
        self.table.get(visitor_id)
    }

    pub fn records(&self) -> &[VisitorRecord] {
        self.table.records()
    }

    /// Cached records whose point of contact is `poc_id`
    pub fn records_for(&self, poc_id: EmployeeId) -> impl Iterator<Item = &VisitorRecord> {
        self.table.records().iter().filter(move |r| r.poc_id == poc_id)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}
