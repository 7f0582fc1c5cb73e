use crate::state_machine::DetectionState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;

type Listener = dyn Fn(&DetectionState) + Send + Sync;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Arc<Listener>)>,
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single-value state cell with replay-of-one fan-out.
///
/// The value lives in a `watch` channel so readers never block writers.
/// Listener delivery happens under the listener lock: transitions reach
/// every listener in the order they were applied, and a listener must not
/// subscribe, unsubscribe or publish from inside its callback.
pub struct StatePublisher {
    state: watch::Sender<DetectionState>,
    listeners: Arc<Mutex<Listeners>>,
}

impl StatePublisher {
    pub fn new(initial: DetectionState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    pub fn current(&self) -> DetectionState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<DetectionState> {
        self.state.subscribe()
    }

    pub fn publish(&self, next: DetectionState) {
        let listeners = lock(&self.listeners);
        self.apply(&listeners, next);
    }

    /// Publish only if `still_current` holds at the moment of publication.
    /// Returns whether the state was applied.
    pub fn publish_if(&self, still_current: impl FnOnce() -> bool, next: DetectionState) -> bool {
        let listeners = lock(&self.listeners);
        if !still_current() {
            return false;
        }
        self.apply(&listeners, next);
        true
    }

    fn apply(&self, listeners: &Listeners, next: DetectionState) {
        tracing::debug!(state = next.name(), listeners = listeners.entries.len(), "Publishing state");

        self.state.send_replace(next);
        let current = self.state.borrow().clone();
        for (_, listener) in &listeners.entries {
            listener(&current);
        }
    }

    /// Attach `listener`; it is called right away with the current state.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DetectionState) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);

        listener(&self.state.borrow().clone());

        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }
}

/// Handle returned by `subscribe`. Dropping it detaches the listener.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.retain(|(id, _)| *id != self.id);
        }
    }
}
