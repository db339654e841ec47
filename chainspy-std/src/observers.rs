//! Observer registry: the final delivery stage of every broadcast.

use crate::{
    isolate::PanicPolicy,
    registry::{Registry, Subscription},
};
use chainspy_core::{
    CallbackError, Chain, Detail, ErrorObserver, ErrorRecord, IntoOutcome, Observer, Publish,
    Stage,
};

/// Success and error subscribers, fanned out in registration order.
///
/// Each publish works on a snapshot of the current subscribers, so a
/// subscriber that unsubscribes itself (or another subscriber) during
/// delivery does not change who receives the publish in flight.
///
/// # Failure isolation
///
/// A success observer that returns `Err` or panics (under
/// [`PanicPolicy::Isolate`]) does not stop the fan-out. Once every observer
/// has run, each failure is published to the error observers as an
/// [`ErrorRecord`] for the same chain, carrying a
/// [`CallbackError`](chainspy_core::CallbackError). Failures of error
/// observers are only logged.
///
/// # Example
///
/// ```rust
/// use chainspy_core::{Chain, Detail};
/// use chainspy_std::observers::ObserverRegistry;
///
/// let registry = ObserverRegistry::new();
/// let subscription = registry.subscribe(|chain: &Chain, _: &Detail| {
///     println!("{chain}");
/// });
///
/// registry.publish(&Chain::from(["form", "submit"]), &Detail::new());
/// subscription.unsubscribe();
/// assert_eq!(registry.len(), 0);
/// ```
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    observers: Registry<dyn Observer>,
    error_observers: Registry<dyn ErrorObserver>,
    policy: PanicPolicy,
}

impl ObserverRegistry {
    /// Create an empty registry that isolates panics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given panic policy.
    pub fn with_policy(policy: PanicPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The panic policy applied to every callback.
    pub fn policy(&self) -> PanicPolicy {
        self.policy
    }

    /// Subscribe a closure to every delivered chain.
    pub fn subscribe<F, R>(&self, f: F) -> Subscription
    where
        F: Fn(&Chain, &Detail) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.subscribe_observer(f)
    }

    /// Subscribe an [`Observer`] implementation.
    pub fn subscribe_observer<O: Observer>(&self, observer: O) -> Subscription {
        self.observers.insert(std::sync::Arc::new(observer))
    }

    /// Subscribe a closure to every published error record.
    pub fn subscribe_error<F, R>(&self, f: F) -> Subscription
    where
        F: Fn(&ErrorRecord) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.subscribe_error_observer(f)
    }

    /// Subscribe an [`ErrorObserver`] implementation.
    pub fn subscribe_error_observer<O: ErrorObserver>(&self, observer: O) -> Subscription {
        self.error_observers.insert(std::sync::Arc::new(observer))
    }

    /// Deliver a chain to every current observer.
    ///
    /// Never consults interception rules.
    pub fn publish(&self, chain: &Chain, detail: &Detail) {
        let observers = self.observers.snapshot();

        #[cfg(feature = "tracing")]
        tracing::trace!(%chain, observers = observers.len(), "publishing chain");

        let mut failures = Vec::new();
        for observer in observers {
            if let Err(err) = self
                .policy
                .run(Stage::Observer, || observer.on_chain(chain, detail))
            {
                #[cfg(feature = "tracing")]
                tracing::warn!(%chain, error = %err, "observer failed");
                failures.push(err);
            }
        }

        for failure in failures {
            self.publish_error(&ErrorRecord::new(chain.clone(), failure));
        }
    }

    /// Deliver an error record to every current error observer.
    pub fn publish_error(&self, record: &ErrorRecord) {
        for observer in self.error_observers.snapshot() {
            if let Err(err) = self.deliver_error(observer.as_ref(), record) {
                #[cfg(feature = "tracing")]
                tracing::error!(chain = %record.chain, error = %err, "error observer failed");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
            }
        }
    }

    fn deliver_error(
        &self,
        observer: &dyn ErrorObserver,
        record: &ErrorRecord,
    ) -> Result<(), CallbackError> {
        self.policy
            .run(Stage::ErrorObserver, || observer.on_error(record))
    }

    /// Drop every subscriber, success and error alike.
    pub fn clear(&self) {
        self.observers.clear();
        self.error_observers.clear();
    }

    /// Number of success observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether there are no success observers.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Number of error observers.
    pub fn error_len(&self) -> usize {
        self.error_observers.len()
    }
}

impl Publish for ObserverRegistry {
    fn publish(&self, chain: &Chain, detail: &Detail) {
        ObserverRegistry::publish(self, chain, detail);
    }
}
