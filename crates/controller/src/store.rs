use crate::{
    config::OverlapPolicy,
    publisher::{StatePublisher, Subscription},
    state_machine::DetectionState,
};
use inference::{DetectionService, InferenceClient};
use preprocess::RawImage;
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use tokio::{
    runtime::Handle,
    sync::watch,
    task::{AbortHandle, JoinHandle},
};

struct Shared<C: InferenceClient> {
    service: DetectionService<C>,
    policy: OverlapPolicy,
    runtime: Handle,
    publisher: StatePublisher,
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl<C: InferenceClient> Shared<C> {
    fn finish(&self, generation: u64, state: DetectionState) {
        let name = state.name();
        let applied = match self.policy {
            OverlapPolicy::LastCompletionWins => {
                self.publisher.publish(state);
                true
            }
            OverlapPolicy::CancelPrevious => self.publisher.publish_if(
                || self.generation.load(Ordering::SeqCst) == generation,
                state,
            ),
        };

        if applied {
            tracing::info!(generation, state = name, "Detection state updated");
        } else {
            tracing::debug!(generation, state = name, "Discarding stale detection outcome");
        }
    }
}

/// Observable holder of the current `DetectionState`.
///
/// Cloning yields another handle onto the same state.
pub struct DetectionStateStore<C: InferenceClient + 'static> {
    shared: Arc<Shared<C>>,
}

impl<C: InferenceClient + 'static> Clone for DetectionStateStore<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: InferenceClient + 'static> DetectionStateStore<C> {
    /// Detection tasks are spawned onto `runtime`.
    pub fn new(service: DetectionService<C>, policy: OverlapPolicy, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                service,
                policy,
                runtime,
                publisher: StatePublisher::new(DetectionState::Idle),
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.shared.policy
    }

    /// Start a detection for `image`.
    ///
    /// `Loading` is published before this returns. The outcome is published
    /// from the spawned task; awaiting the handle is optional and dropping it
    /// does not cancel the run.
    pub fn detect(&self, image: RawImage) -> JoinHandle<()> {
        let mut in_flight = self
            .shared
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if self.shared.policy == OverlapPolicy::CancelPrevious
            && let Some(previous) = in_flight.take()
            && !previous.is_finished()
        {
            tracing::debug!(generation, "Cancelling in-flight detection");
            previous.abort();
        }

        tracing::debug!(
            generation,
            width = image.width(),
            height = image.height(),
            "Detection started"
        );
        self.shared.publisher.publish(DetectionState::Loading);

        let shared = Arc::clone(&self.shared);
        let handle = self.shared.runtime.spawn(async move {
            let outcome = shared.service.run(&image).await;
            shared.finish(generation, DetectionState::from_outcome(outcome));
        });

        *in_flight = Some(handle.abort_handle());
        handle
    }

    /// Attach a listener. It is called immediately with the current state and
    /// then on every transition, on the publishing thread. Listeners must not
    /// call `detect()` from inside the callback.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DetectionState) + Send + Sync + 'static,
    {
        self.shared.publisher.subscribe(listener)
    }

    pub fn watch(&self) -> watch::Receiver<DetectionState> {
        self.shared.publisher.watch()
    }

    pub fn current_state(&self) -> DetectionState {
        self.shared.publisher.current()
    }
}
