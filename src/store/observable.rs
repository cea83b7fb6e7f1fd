//! Observable values with explicit subscriptions.
//!
//! Listeners are called synchronously, first on subscription with the current
//! value and then after every `set`. The internal lock is released before
//! listeners run, so a listener may read or write any observable.

use std::fmt;
use std::sync::{
    Arc,
    Mutex,
    Weak,
};

use super::lock;

/// Change listener.
type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Value and listeners behind the lock.
struct Slot<T> {
    /// Current value.
    value: T,
    /// Listeners in registration order, keyed by subscription id.
    listeners: Vec<(u64, Listener<T>)>,
    /// Id handed to the next subscription.
    next_id: u64,
}

/// A value that can be read, written and subscribed to.
pub struct Observable<T> {
    /// Shared state; clones observe the same value.
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { slot: Arc::clone(&self.slot) }
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { slot: Arc::new(Mutex::new(Slot { value, listeners: Vec::new(), next_id: 0 })) }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.slot).value.clone()
    }

    /// Stores `value` and notifies every listener.
    pub fn set(&self, value: T) {
        let (value, listeners) = {
            let mut slot = lock(&self.slot);
            slot.value = value;
            let listeners: Vec<Listener<T>> =
                slot.listeners.iter().map(|(_, listener)| Arc::clone(listener)).collect();
            (slot.value.clone(), listeners)
        };

        for listener in listeners {
            listener(&value);
        }
    }

    /// Stores `value` only if it differs from the current one.
    ///
    /// Returns true if listeners were notified.
    pub fn set_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        if lock(&self.slot).value == value {
            return false;
        }
        self.set(value);
        true
    }

    /// Replaces the value with `f(current)`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&lock(&self.slot).value);
        self.set(next);
    }

    /// Registers a listener and immediately calls it with the current value.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let listener: Listener<T> = Arc::new(listener);
        let (id, current) = {
            let mut slot = lock(&self.slot);
            let id = slot.next_id;
            slot.next_id += 1;
            slot.listeners.push((id, Arc::clone(&listener)));
            (id, slot.value.clone())
        };

        listener(&current);

        let slot: Weak<Mutex<Slot<T>>> = Arc::downgrade(&self.slot);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(slot) = slot.upgrade() {
                    lock(&slot).listeners.retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }

    /// Read-only view of this observable.
    #[must_use]
    pub fn readable(&self) -> Readable<T> {
        Readable { inner: self.clone() }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.slot).listeners.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = lock(&self.slot);
        f.debug_struct("Observable")
            .field("value", &slot.value)
            .field("listeners", &slot.listeners.len())
            .finish()
    }
}

/// Read-only handle on an [`Observable`].
pub struct Readable<T> {
    /// Wrapped observable.
    inner: Observable<T>,
}

impl<T> Clone for Readable<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Clone + Send + 'static> Readable<T> {
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.get()
    }

    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.inner.subscribe(listener)
    }
}

impl<T: fmt::Debug> fmt::Debug for Readable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// Guard returned by `subscribe`; unsubscribes on drop.
pub struct Subscription {
    /// Removal callback; taken on first use.
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(mut self) {
        self.run();
    }

    /// Runs the removal callback at most once.
    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.unsubscribe.is_some()).finish()
    }
}
