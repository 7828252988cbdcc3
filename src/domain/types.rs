//! Shared identifier and value types

use serde::{Deserialize, Serialize};

/// Newtype wrapper for visitor IDs to provide type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct VisitorId(pub u32);

impl std::fmt::Display for VisitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype wrapper for employee IDs (point-of-contact identity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct EmployeeId(pub u32);

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An employee who may act as point of contact for visitors
///
/// Immutable once built; the subscriber that holds it owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub title: String,
}

impl Employee {
    pub fn new(id: u32, name: &str, title: &str) -> Self {
        Self { id: EmployeeId(id), name: name.to_string(), title: title.to_string() }
    }
}
