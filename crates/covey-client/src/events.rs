//! Typed publish/subscribe channels.
//!
//! Every mutable field of an area controller has its own [`Channel`]
//! carrying the field's type, so a listener can only ever receive the
//! value it subscribed to.
//!
//! Emission is synchronous: [`Channel::emit`] calls every listener before
//! it returns. The listener list is copied out before the calls, so
//! listeners run with no lock held and may subscribe, unsubscribe or read
//! the emitting controller.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// One typed event channel.
pub struct Channel<T> {
    inner: Arc<Mutex<Listeners<T>>>,
}

impl<T> core::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Channel")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<T: 'static> Channel<T> {
    /// Create a channel with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for every future emission.
    ///
    /// The listener stays registered until the returned [`Subscription`]
    /// is dropped or explicitly unsubscribed.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id = inner.next_id.wrapping_add(1);
            inner.entries.push((id, Arc::new(listener)));
            id
        };
        let weak: Weak<Mutex<Listeners<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().entries.retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    /// Call every listener with `value`.
    pub fn emit(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(value);
        }
    }
}

impl<T> Channel<T> {
    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

/// Handle to a registered listener.
///
/// Dropping it removes the listener. Outliving the channel is fine.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    /// Keep the listener registered for the life of the channel.
    pub fn detach(mut self) {
        self.release = None;
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}
