//! Visitor watch library
//!
//! In-process publish-subscribe engine for building-access notifications.
//! Exposes modules for integration testing and binary reuse.

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
