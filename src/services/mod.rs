//! Services - the publish-subscribe engine
//!
//! This module contains the core notification services:
//! - `publisher` - Authoritative visit state and synchronous fan-out
//! - `subscription` - Subscriber registry and revocable handles
//! - `subscriber` - Subscriber capability and shared subscribe/unsubscribe wrappers
//! - `visitor_cache` - Id-indexed visitor tables and entry/exit inference
//! - `point_of_contact` - Subscriber filtered to one employee's visitors
//! - `security_staff` - Subscriber for every visitor
//! - `session` - Drives a scripted tracking period end to end

pub mod error;
pub mod point_of_contact;
pub mod publisher;
pub mod security_staff;
pub mod session;
pub mod subscriber;
pub mod subscription;
pub mod visitor_cache;

// Re-export commonly used types
pub use error::NotifyError;
pub use point_of_contact::PointOfContactSubscriber;
pub use publisher::Publisher;
pub use security_staff::SecurityStaffSubscriber;
pub use session::Session;
pub use subscriber::{Attach, Subscriber, SubscriptionSlot};
pub use subscription::{SubscriberSet, SubscriptionHandle, SubscriptionId};
pub use visitor_cache::{Transition, VisitorCache, VisitorTable};
