//! Subscriber registry and revocable subscription handles
//!
//! The [`SubscriberSet`] is the ordered list of registrations owned by a
//! [`Publisher`](crate::services::Publisher). Every registration gets a fresh
//! [`SubscriptionId`], so the same subscriber can be registered more than once
//! and each registration is removed independently.
//!
//! ```text
//!   Publisher::subscribe(sub) ──► SubscriberSet::insert ──► SubscriptionHandle
//!                                        │                        │
//!                              [reg#1, reg#2, reg#3]              │ release()
//!                                        ▲                        │
//!                                        └──── retain(id != #n) ◄─┘
//! ```
//!
//! Handles hold a `Weak` reference to the set. Releasing is explicit (there is
//! no release on drop) and idempotent.

use crate::services::subscriber::Subscriber;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Identifies one registration in a [`SubscriberSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Registration {
    id: SubscriptionId,
    subscriber: Arc<dyn Subscriber>,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Registration>,
    next_id: u64,
}

/// Ordered, shared registry of subscribers
///
/// Insertion order is dispatch order. Membership only changes through
/// [`SubscriberSet::insert`] and [`SubscriptionHandle::release`].
#[derive(Default)]
pub struct SubscriberSet {
    registry: Arc<Mutex<Registry>>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber and return the handle that removes it again.
    ///
    /// No de-duplication: inserting the same subscriber twice creates two
    /// registrations.
    pub fn insert(&self, subscriber: Arc<dyn Subscriber>) -> SubscriptionHandle {
        let mut registry = self.registry.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;

        debug!(subscription_id = %id, subscriber = %subscriber.name(), "subscriber_registered");
        registry.entries.push(Registration { id, subscriber });

        SubscriptionHandle {
            id,
            registry: Arc::downgrade(&self.registry),
            released: AtomicBool::new(false),
        }
    }

    /// Stable copy of the current subscribers, in registration order.
    ///
    /// Taken under the lock and returned without it, so callbacks invoked over
    /// the snapshot may subscribe or unsubscribe freely.
    pub fn snapshot(&self) -> Vec<Arc<dyn Subscriber>> {
        self.registry.lock().entries.iter().map(|r| Arc::clone(&r.subscriber)).collect()
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.registry.lock().entries.iter().any(|r| r.id == id)
    }

    /// Registration ids in dispatch order
    pub fn ids(&self) -> Vec<SubscriptionId> {
        self.registry.lock().entries.iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.lock().entries.is_empty()
    }
}

/// Revocable capability for one registration
///
/// Not `Clone`: exactly one handle exists per registration.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    registry: Weak<Mutex<Registry>>,
    released: AtomicBool,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// True until [`Self::release`] has been called
    pub fn is_active(&self) -> bool {
        !self.released.load(Ordering::Acquire)
    }

    /// Remove the registration from its set.
    ///
    /// Returns `true` if this call removed it. Later calls, and calls after the
    /// owning set is gone, return `false` and do nothing.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }

        let Some(registry) = self.registry.upgrade() else {
            debug!(subscription_id = %self.id, "subscription_release_orphaned");
            return false;
        };

        let mut registry = registry.lock();
        let before = registry.entries.len();
        registry.entries.retain(|r| r.id != self.id);
        let removed = registry.entries.len() != before;

        debug!(subscription_id = %self.id, removed = %removed, "subscription_released");
        removed
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
