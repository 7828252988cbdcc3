//! Domain models - visitor records and employees
//!
//! This module contains the canonical data types used throughout the system:
//! - `VisitorRecord` - one visit, from entry to exit
//! - `Employee` - a point of contact for visitors
//! - `VisitorId` / `EmployeeId` - typed identifiers

pub mod types;
pub mod visitor;

pub use types::{Employee, EmployeeId, VisitorId};
pub use visitor::VisitorRecord;
