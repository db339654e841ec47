//! Ordered subscriber slots with identity-based removal.
//!
//! A [`Registry`] keeps entries in registration order. Fan-out always works
//! on a [`Registry::snapshot`], so entries removed while a snapshot is being
//! iterated still receive the in-flight delivery.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

/// Identity of one registration. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Slots<O: ?Sized> {
    next: u64,
    entries: Vec<(SubscriptionId, Arc<O>)>,
}

trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId);
}

impl<O: ?Sized + Send + Sync> Detach for Mutex<Slots<O>> {
    fn detach(&self, id: SubscriptionId) {
        let mut slots = self.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entries.retain(|(entry, _)| *entry != id);
    }
}

/// A list of shared subscribers.
pub struct Registry<O: ?Sized> {
    slots: Arc<Mutex<Slots<O>>>,
}

impl<O: ?Sized + Send + Sync + 'static> Registry<O> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                next: 0,
                entries: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots<O>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry and return the token that removes it.
    pub fn insert(&self, entry: Arc<O>) -> Subscription {
        let id = {
            let mut slots = self.lock();
            let id = SubscriptionId(slots.next);
            slots.next += 1;
            slots.entries.push((id, entry));
            id
        };

        let slots: Arc<dyn Detach> = self.slots.clone();
        Subscription {
            id,
            slots: Arc::downgrade(&slots),
        }
    }

    /// Copy the current entries, in registration order.
    ///
    /// The lock is released before this returns.
    pub fn snapshot(&self) -> Vec<Arc<O>> {
        self.lock()
            .entries
            .iter()
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    /// Remove every entry. Outstanding subscriptions become no-ops.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

impl<O: ?Sized + Send + Sync + 'static> Default for Registry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ?Sized + Send + Sync + 'static> fmt::Debug for Registry<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.len())
            .finish()
    }
}

/// Token returned by a subscribe call.
///
/// Dropping it leaves the subscription in place; call
/// [`unsubscribe`](Self::unsubscribe), or convert it with
/// [`into_guard`](Self::into_guard) for scoped removal.
#[derive(Clone)]
pub struct Subscription {
    id: SubscriptionId,
    slots: Weak<dyn Detach>,
}

impl Subscription {
    /// The identity of the registration.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the registration. Calling it again has no effect.
    ///
    /// Takes effect from the next publish; a publish already in progress
    /// still reaches this subscriber.
    pub fn unsubscribe(&self) {
        if let Some(slots) = self.slots.upgrade() {
            slots.detach(self.id);
        }
    }

    /// Unsubscribe automatically when the returned guard is dropped.
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard {
            subscription: self,
            armed: true,
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscription").field(&self.id).finish()
    }
}

/// Unsubscribes when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct SubscriptionGuard {
    subscription: Subscription,
    armed: bool,
}

impl SubscriptionGuard {
    /// Keep the subscription alive past the guard.
    pub fn release(mut self) -> Subscription {
        self.armed = false;
        self.subscription.clone()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if self.armed {
            self.subscription.unsubscribe();
        }
    }
}
