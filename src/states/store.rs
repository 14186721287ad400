//! Reactive Store
//!
//! Shared state holder with explicit change notification. Updates run through
//! [`Store::update`], which hands the closure a [`Context`]; calling
//! `cx.notify()` re-runs every observer once the write lock is released, and
//! `cx.emit()` queues a [`UIEvent`] for every subscriber.
//!
//! ```text
//! controller ── update(|state, cx| …) ──► state mutated
//!                                          │ cx.notify()   cx.emit(UIEvent)
//!                                          ▼               ▼
//!                                      observers      event receivers
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use crate::states::UIEvent;

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Collects notifications and events raised during one update
#[derive(Debug, Default)]
pub struct Context {
    notified: bool,
    events: Vec<UIEvent>,
}

impl Context {
    /// Mark the state as changed
    pub fn notify(&mut self) {
        self.notified = true;
    }

    /// Queue an event for subscribers
    pub fn emit(&mut self, event: UIEvent) {
        self.events.push(event);
    }

    pub fn is_notified(&self) -> bool {
        self.notified
    }

    /// Events queued so far
    pub fn events(&self) -> &[UIEvent] {
        &self.events
    }
}

struct StoreInner<T> {
    state: RwLock<T>,
    observers: Mutex<Vec<(u64, Observer<T>)>>,
    next_observer: AtomicU64,
    subscribers: Mutex<Vec<Sender<UIEvent>>>,
}

/// Shared, observable state
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> Store<T> {
    pub fn new(state: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(state),
                observers: Mutex::new(Vec::new()),
                next_observer: AtomicU64::new(0),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Read the current state
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.state.read())
    }

    /// Mutate the state; observers run afterwards if `cx.notify()` was called
    pub fn update<R>(&self, f: impl FnOnce(&mut T, &mut Context) -> R) -> R {
        let mut cx = Context::default();
        let result = {
            let mut state = self.inner.state.write();
            f(&mut state, &mut cx)
        };

        if !cx.events.is_empty() {
            self.broadcast(cx.events);
        }
        if cx.notified {
            self.notify_observers();
        }
        result
    }

    fn broadcast(&self, events: Vec<UIEvent>) {
        let mut subscribers = self.inner.subscribers.lock();
        for event in events {
            // Drop receivers that went away
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn notify_observers(&self) {
        let observers: Vec<Observer<T>> = self
            .inner
            .observers
            .lock()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        if observers.is_empty() {
            return;
        }
        let state = self.inner.state.read();
        for observer in observers {
            observer(&state);
        }
    }

    /// Run `f` after every notifying update until the subscription is dropped
    ///
    /// Observers see the state under a read lock and must not update this store.
    pub fn observe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_observer.fetch_add(1, Ordering::Relaxed);
        self.inner.observers.lock().push((id, Arc::new(f)));

        let weak = Arc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.observers.lock().retain(|(other, _)| *other != id);
                }
            })),
        }
    }

    /// Receive every event emitted after this call
    pub fn subscribe_events(&self) -> Receiver<UIEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.inner.subscribers.lock().push(tx);
        rx
    }

    #[cfg(test)]
    fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }
}

/// Keeps an observer registered; dropping it unregisters
#[must_use = "dropping a Subscription unregisters the observer"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_observers_run_only_on_notify() {
        let store = Store::new(0u32);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let _sub = store.observe(move |value| {
            seen_clone.store(*value as usize, Ordering::SeqCst);
        });

        store.update(|value, _cx| *value = 5);
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        store.update(|value, cx| {
            *value = 7;
            cx.notify();
        });
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_dropping_subscription_unregisters() {
        let store = Store::new(());
        let first = store.observe(|_| {});
        let _second = store.observe(|_| {});
        assert_eq!(store.observer_count(), 2);
        drop(first);
        assert_eq!(store.observer_count(), 1);
    }

    #[test]
    fn test_events_reach_every_subscriber() {
        let store = Store::new(());
        let a = store.subscribe_events();
        let b = store.subscribe_events();

        store.update(|_, cx| cx.emit(UIEvent::info("toast-code-sent")));

        assert_eq!(a.try_recv().ok(), Some(UIEvent::info("toast-code-sent")));
        assert_eq!(b.try_recv().ok(), Some(UIEvent::info("toast-code-sent")));
        assert!(a.try_recv().is_err());
    }
}
