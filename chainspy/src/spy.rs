//! The broadcast facade.

use crate::config::SpyConfig;
use chainspy_core::{
    BoxError, Chain, Delivery, Detail, ErrorObserver, ErrorRecord, Interceptor, IntoChain,
    IntoOutcome, Observer, Stage, Traced, Verdict, resolve_chain,
};
use chainspy_std::{
    intercept::{InterceptEngine, RuleConflict, Rules},
    observers::ObserverRegistry,
    registry::Subscription,
};
use std::{fmt, sync::Arc};

struct SpyInner {
    config: SpyConfig,
    observers: ObserverRegistry,
    rules: InterceptEngine,
}

/// Tracing context: one observer registry plus one interception rule tree.
///
/// Cloning a `Spy` yields another handle to the same state. Use
/// [`global`](crate::global) for the process-wide instance, or create
/// independent instances for isolated tests.
///
/// # Pipeline
///
/// - [`send_from`](Self::send_from) resolves the component's chain, appends
///   the fragment, runs the component's own handler and then broadcasts.
/// - [`broadcast`](Self::broadcast) asks the rule tree for an interceptor.
///   Without one, or unless it suppresses, the chain is published.
/// - [`error_from`](Self::error_from) resolves the same way but never drops:
///   an untraceable component is reported under the unknown segment.
///
/// # Failures
///
/// An interceptor or handler that returns `Err` (or panics, under
/// [`PanicPolicy::Isolate`](chainspy_std::isolate::PanicPolicy::Isolate)) is
/// reported to the error observers with a
/// [`CallbackError`](chainspy_core::CallbackError), and the original chain
/// continues as if the callback had not been there.
///
/// # Example
///
/// ```rust
/// use chainspy::{Chain, Delivery, Detail, Rules, Spy};
/// use std::sync::{Arc, Mutex};
///
/// let spy = Spy::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// spy.subscribe(move |chain: &Chain, _: &Detail| sink.lock().unwrap().push(chain.to_string()));
///
/// spy.intercept(Rules::new().on("login", |delivery: &Delivery<'_>, chain: &Chain, _: &Detail| {
///     delivery.send(chain.with("rewritten"));
///     false
/// }));
///
/// spy.send(["login", "submit"]);
/// spy.send(["logout"]);
/// assert_eq!(*seen.lock().unwrap(), ["login.submit.rewritten", "logout"]);
/// ```
#[derive(Clone)]
pub struct Spy {
    inner: Arc<SpyInner>,
}

impl Default for Spy {
    fn default() -> Self {
        Self::new()
    }
}

impl Spy {
    /// Create an empty context with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SpyConfig::default())
    }

    /// Create an empty context.
    pub fn with_config(config: SpyConfig) -> Self {
        let observers = ObserverRegistry::with_policy(config.panic_policy());
        Self {
            inner: Arc::new(SpyInner {
                config,
                observers,
                rules: InterceptEngine::new(),
            }),
        }
    }

    /// The configuration this context was created with.
    pub fn config(&self) -> &SpyConfig {
        &self.inner.config
    }

    /// The observer registry, for inspection.
    pub fn observers(&self) -> &ObserverRegistry {
        &self.inner.observers
    }

    /// Drop every observer and every interception rule.
    ///
    /// Subscriptions handed out before the reset become no-ops.
    pub fn reset(&self) {
        self.inner.observers.clear();
        self.inner.rules.clear();

        #[cfg(feature = "tracing")]
        tracing::debug!("spy reset");
    }

    // ------------------------------------------------------------------------
    // Subscription
    // ------------------------------------------------------------------------

    /// Subscribe a closure to every delivered chain.
    pub fn subscribe<F, R>(&self, f: F) -> Subscription
    where
        F: Fn(&Chain, &Detail) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.inner.observers.subscribe(f)
    }

    /// Subscribe an [`Observer`] implementation.
    pub fn subscribe_observer<O: Observer>(&self, observer: O) -> Subscription {
        self.inner.observers.subscribe_observer(observer)
    }

    /// Subscribe a closure to every error record.
    pub fn subscribe_error<F, R>(&self, f: F) -> Subscription
    where
        F: Fn(&ErrorRecord) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.inner.observers.subscribe_error(f)
    }

    /// Subscribe an [`ErrorObserver`] implementation.
    pub fn subscribe_error_observer<O: ErrorObserver>(&self, observer: O) -> Subscription {
        self.inner.observers.subscribe_error_observer(observer)
    }

    // ------------------------------------------------------------------------
    // Interception
    // ------------------------------------------------------------------------

    /// Merge interception rules. Replaced registrations are returned and logged.
    pub fn intercept(&self, rules: Rules) -> Vec<RuleConflict> {
        self.inner.rules.register(rules)
    }

    /// The interceptor a broadcast of `chain` would run.
    pub fn find_interceptor(&self, chain: &Chain) -> Option<Arc<dyn Interceptor>> {
        self.inner.rules.resolve(chain)
    }

    // ------------------------------------------------------------------------
    // Success path
    // ------------------------------------------------------------------------

    /// Broadcast a chain through interception to the observers.
    pub fn broadcast(&self, chain: impl IntoChain, detail: Detail) {
        let chain = chain.into_chain();

        let Some(interceptor) = self.inner.rules.resolve(&chain) else {
            self.inner.observers.publish(&chain, &detail);
            return;
        };

        let delivery = Delivery::new(&self.inner.observers);
        let verdict = self.inner.config.panic_policy().run(Stage::Interceptor, || {
            interceptor.intercept(&delivery, &chain, &detail)
        });

        match verdict {
            Ok(Verdict::Suppress) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%chain, "chain suppressed by interceptor");
            }
            Ok(Verdict::Deliver) => self.inner.observers.publish(&chain, &detail),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%chain, error = %err, "interceptor failed, delivering original chain");
                self.inner
                    .observers
                    .publish_error(&ErrorRecord::new(chain.clone(), err));
                self.inner.observers.publish(&chain, &detail);
            }
        }
    }

    /// Broadcast a chain with an empty detail.
    pub fn send(&self, chain: impl IntoChain) {
        self.broadcast(chain, Detail::new());
    }

    /// Broadcast a chain with a detail.
    pub fn send_with(&self, chain: impl IntoChain, detail: Detail) {
        self.broadcast(chain, detail);
    }

    /// Send `fragment` scoped to `component`, with an empty detail.
    pub fn send_from<T: Traced>(&self, component: &T, fragment: impl IntoChain) {
        self.send_from_with(component, fragment, Detail::new());
    }

    /// Send `fragment` scoped to `component`.
    ///
    /// An untraceable component drops the event. Otherwise the component's
    /// handler sees the full chain first and may veto it, in which case no
    /// interceptor runs either.
    pub fn send_from_with<T: Traced>(&self, component: &T, fragment: impl IntoChain, detail: Detail) {
        let scope = resolve_chain(component);
        if scope.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::trace!("dropping send from a component without identity");
            return;
        }

        let chain = scope.concat(fragment);
        let verdict = self
            .inner
            .config
            .panic_policy()
            .run(Stage::Handler, || component.handle(&chain));

        match verdict {
            Ok(Verdict::Suppress) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%chain, "chain vetoed by component handler");
            }
            Ok(Verdict::Deliver) => self.broadcast(chain, detail),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%chain, error = %err, "component handler failed, sending anyway");
                self.inner
                    .observers
                    .publish_error(&ErrorRecord::new(chain.clone(), err));
                self.broadcast(chain, detail);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Error path
    // ------------------------------------------------------------------------

    /// Deliver an error record to the error observers. Never intercepted.
    pub fn broadcast_error(&self, record: ErrorRecord) {
        self.inner.observers.publish_error(&record);
    }

    /// Report `error` under `chain`.
    pub fn error(&self, chain: impl IntoChain, error: impl Into<BoxError>) {
        self.broadcast_error(ErrorRecord::new(chain.into_chain(), error));
    }

    /// Report `error` under `chain` with extra information.
    pub fn error_with(&self, chain: impl IntoChain, error: impl Into<BoxError>, info: Detail) {
        self.broadcast_error(ErrorRecord::new(chain.into_chain(), error).with_info(info));
    }

    /// Report `error` scoped to `component`.
    ///
    /// Unlike [`send_from`](Self::send_from), an untraceable component is not
    /// dropped: the chain starts with the configured unknown segment instead.
    pub fn error_from<T: Traced>(&self, component: &T, fragment: impl IntoChain, error: impl Into<BoxError>) {
        self.broadcast_error(ErrorRecord::new(self.error_chain(component, fragment), error));
    }

    /// Report `error` scoped to `component`, with extra information.
    pub fn error_from_with<T: Traced>(
        &self,
        component: &T,
        fragment: impl IntoChain,
        error: impl Into<BoxError>,
        info: Detail,
    ) {
        self.broadcast_error(
            ErrorRecord::new(self.error_chain(component, fragment), error).with_info(info),
        );
    }

    fn error_chain<T: Traced>(&self, component: &T, fragment: impl IntoChain) -> Chain {
        let scope = resolve_chain(component);
        if scope.is_empty() {
            Chain::root(self.inner.config.unknown_segment()).concat(fragment)
        } else {
            scope.concat(fragment)
        }
    }
}

impl fmt::Debug for Spy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spy")
            .field("config", &self.inner.config)
            .field("observers", &self.inner.observers)
            .field("rules", &self.inner.rules)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainspy_std::{
        isolate::PanicPolicy,
        testing::{RecordingErrorObserver, RecordingInterceptor, RecordingObserver},
    };

    struct Leaf {
        id: Option<&'static str>,
        veto: bool,
    }

    impl Traced for Leaf {
        fn spy_id(&self) -> Option<String> {
            self.id.map(str::to_owned)
        }

        fn ancestor(&self) -> Option<Self> {
            None
        }

        fn handle(&self, _chain: &Chain) -> Result<Verdict, BoxError> {
            Ok(if self.veto {
                Verdict::Suppress
            } else {
                Verdict::Deliver
            })
        }
    }

    fn recorded(spy: &Spy) -> (RecordingObserver, RecordingErrorObserver) {
        let chains = RecordingObserver::new();
        let errors = RecordingErrorObserver::new();
        spy.subscribe_observer(chains.clone());
        spy.subscribe_error_observer(errors.clone());
        (chains, errors)
    }

    #[test]
    fn test_broadcast_without_rules_publishes() {
        let spy = Spy::new();
        let (chains, _) = recorded(&spy);

        spy.send_with(["a", "b"], Detail::new().with("val", 1));

        let events = chains.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, ["a", "b"]);
        assert_eq!(events[0].1, Detail::new().with("val", 1));
    }

    #[test]
    fn test_passing_interceptor_still_delivers() {
        let spy = Spy::new();
        let (chains, _) = recorded(&spy);
        let interceptor = RecordingInterceptor::new();
        spy.intercept(Rules::new().on_interceptor("a", interceptor.clone()));

        spy.send(["a", "b"]);

        assert_eq!(interceptor.chains(), [Chain::from(["a", "b"])]);
        assert_eq!(chains.chains(), [Chain::from(["a", "b"])]);
    }

    #[test]
    fn test_suppressing_interceptor_blocks_delivery() {
        let spy = Spy::new();
        let (chains, _) = recorded(&spy);
        spy.intercept(
            Rules::new().on_interceptor("a", RecordingInterceptor::with_verdict(Verdict::Suppress)),
        );

        spy.send(["a"]);
        assert_eq!(chains.count(), 0);
    }

    #[test]
    fn test_failing_interceptor_fails_open() {
        let spy = Spy::new();
        let (chains, errors) = recorded(&spy);
        spy.intercept(Rules::new().on(
            "a",
            |_: &Delivery<'_>, _: &Chain, _: &Detail| -> Result<Verdict, BoxError> {
                Err("rule crashed".into())
            },
        ));

        spy.send(["a", "b"]);

        assert_eq!(chains.chains(), [Chain::from(["a", "b"])]);
        let records = errors.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stage, Some(Stage::Interceptor));
        assert_eq!(records[0].chain, ["a", "b"]);
    }

    #[test]
    fn test_scoped_send_appends_fragment_and_respects_veto() {
        let spy = Spy::new();
        let (chains, _) = recorded(&spy);

        spy.send_from(&Leaf { id: Some("btn"), veto: false }, "click");
        spy.send_from(&Leaf { id: Some("btn"), veto: true }, "click");
        spy.send_from(&Leaf { id: None, veto: false }, "click");

        assert_eq!(chains.chains(), [Chain::from(["btn", "click"])]);
    }

    #[test]
    fn test_handler_veto_skips_interception() {
        let spy = Spy::new();
        let interceptor = RecordingInterceptor::new();
        spy.intercept(Rules::new().on_interceptor("btn", interceptor.clone()));

        spy.send_from(&Leaf { id: Some("btn"), veto: true }, "click");
        assert_eq!(interceptor.count(), 0);
    }

    #[test]
    fn test_error_from_untraceable_uses_unknown_root() {
        let spy = Spy::with_config(SpyConfig::new().with_unknown_segment("NOBODY"));
        let (chains, errors) = recorded(&spy);

        spy.error_from(&Leaf { id: None, veto: false }, "oops", "bad input");
        spy.error_from_with(
            &Leaf { id: Some("form"), veto: false },
            ["field", "oops"],
            "bad input",
            Detail::new().with("stack", "form > field"),
        );

        let records = errors.records();
        assert_eq!(records[0].chain, ["NOBODY", "oops"]);
        assert_eq!(records[0].message, "bad input");
        assert_eq!(records[1].chain, ["form", "field", "oops"]);
        assert!(records[1].info.is_some());
        assert_eq!(chains.count(), 0);
    }

    #[test]
    fn test_errors_are_never_intercepted() {
        let spy = Spy::new();
        let (_, errors) = recorded(&spy);
        let interceptor = RecordingInterceptor::with_verdict(Verdict::Suppress);
        spy.intercept(Rules::new().on_interceptor("a", interceptor.clone()));

        spy.error(["a"], "boom");

        assert_eq!(interceptor.count(), 0);
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn test_reset_clears_state_but_keeps_config() {
        let spy = Spy::with_config(SpyConfig::new().with_panic_policy(PanicPolicy::Propagate));
        let (chains, _) = recorded(&spy);
        spy.intercept(Rules::new().on_interceptor("a", RecordingInterceptor::new()));

        spy.reset();
        spy.send(["a"]);

        assert_eq!(chains.count(), 0);
        assert!(spy.find_interceptor(&Chain::root("a")).is_none());
        assert!(spy.observers().is_empty());
        assert_eq!(spy.config().panic_policy(), PanicPolicy::Propagate);
    }

    #[test]
    fn test_clones_share_state() {
        let spy = Spy::new();
        let other = spy.clone();
        let (chains, _) = recorded(&spy);

        other.send(["shared"]);
        assert_eq!(chains.count(), 1);
    }
}
