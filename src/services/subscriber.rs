//! # Subscriber capability
//!
//! [`Subscriber`] is what the [`Publisher`] calls into. [`Attach`] layers the
//! `subscribe`/`unsubscribe` convenience wrappers on top, sharing their logic
//! through a [`SubscriptionSlot`] each variant embeds.
//!
//! ## Rules
//! - Callbacks run synchronously on the publisher's thread, one subscriber at
//!   a time, in registration order.
//! - Returning `Err` stops the fan-out; the publisher returns the error to its
//!   caller.
//! - The publisher never calls [`Subscriber::on_error`]; it exists for
//!   surrounding code that detects a problem itself.
//!
//! ## Example
//! ```rust
//! use visitor_watch::domain::VisitorRecord;
//! use visitor_watch::services::{NotifyError, Subscriber};
//!
//! struct Counter(std::sync::atomic::AtomicUsize);
//!
//! impl Subscriber for Counter {
//!     fn on_notify(&self, _record: &VisitorRecord) -> Result<(), NotifyError> {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         Ok(())
//!     }
//!
//!     fn on_error(&self, _error: &NotifyError) {}
//!
//!     fn on_complete(&self) -> Result<(), NotifyError> {
//!         Ok(())
//!     }
//! }
//! ```

use crate::domain::VisitorRecord;
use crate::services::error::NotifyError;
use crate::services::publisher::Publisher;
use crate::services::subscription::{SubscriptionHandle, SubscriptionId};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::sync::Arc;

/// Receiver of visitor notifications
pub trait Subscriber: Send + Sync {
    /// Called once per state change: on entry and again on exit.
    ///
    /// The notification carries no event type; implementations infer entry
    /// versus exit from what they have already seen.
    fn on_notify(&self, record: &VisitorRecord) -> Result<(), NotifyError>;

    /// Abnormal condition signalled by surrounding code.
    fn on_error(&self, error: &NotifyError);

    /// End of the tracking period. No further notifications follow.
    fn on_complete(&self) -> Result<(), NotifyError>;

    /// Name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Handles held by one subscriber
///
/// Most subscribers register once, hence the inline capacity of one.
#[derive(Debug, Default)]
pub struct SubscriptionSlot {
    handles: Mutex<SmallVec<[SubscriptionHandle; 1]>>,
}

impl SubscriptionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&self, handle: SubscriptionHandle) {
        self.handles.lock().push(handle);
    }

    /// Release every held handle. Returns how many registrations were removed.
    pub fn release_all(&self) -> usize {
        // Drain first so no slot lock is held while the registry lock is taken.
        let drained: SmallVec<[SubscriptionHandle; 1]> = self.handles.lock().drain(..).collect();
        drained.iter().filter(|handle| handle.release()).count()
    }

    pub fn is_attached(&self) -> bool {
        self.handles.lock().iter().any(SubscriptionHandle::is_active)
    }

    pub fn ids(&self) -> Vec<SubscriptionId> {
        self.handles.lock().iter().map(SubscriptionHandle::id).collect()
    }
}

/// Subscribe/unsubscribe wrappers shared by the concrete subscribers
///
/// Implementors are cheap `Clone` handles over shared state, so the publisher
/// can hold its own copy while the caller keeps another.
pub trait Attach: Subscriber + Clone + 'static {
    fn slot(&self) -> &SubscriptionSlot;

    /// Drop everything the subscriber has observed so far.
    fn clear_cache(&self);

    /// Register with `publisher` and keep the handle for a later
    /// [`Attach::unsubscribe`].
    fn subscribe(&self, publisher: &Publisher) -> SubscriptionId {
        let handle = publisher.subscribe(Arc::new(self.clone()));
        let id = handle.id();
        self.slot().hold(handle);
        id
    }

    /// Detach from every publisher this subscriber joined and clear its local
    /// cache. Safe to call repeatedly.
    fn unsubscribe(&self) {
        self.slot().release_all();
        self.clear_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::subscription::SubscriberSet;

    struct Noop;

    impl Subscriber for Noop {
        fn on_notify(&self, _record: &VisitorRecord) -> Result<(), NotifyError> {
            Ok(())
        }

        fn on_error(&self, _error: &NotifyError) {}

        fn on_complete(&self) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert!(Noop.name().ends_with("Noop"));
    }

    #[test]
    fn test_slot_release_all() {
        let set = SubscriberSet::new();
        let slot = SubscriptionSlot::new();
        slot.hold(set.insert(Arc::new(Noop)));
        slot.hold(set.insert(Arc::new(Noop)));

        assert!(slot.is_attached());
        assert_eq!(slot.ids().len(), 2);
        assert_eq!(slot.release_all(), 2);
        assert!(!slot.is_attached());
        assert!(set.is_empty());

        // Second release finds nothing to do
        assert_eq!(slot.release_all(), 0);
    }
}
