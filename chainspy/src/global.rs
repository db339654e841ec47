//! Process-wide tracing context and free functions acting on it.
//!
//! Tests that touch the global instance should call [`reset`] first; tests
//! that need isolation from each other should prefer their own [`Spy`].

use crate::spy::Spy;
use chainspy_core::{BoxError, Chain, Detail, ErrorRecord, IntoChain, IntoOutcome, Traced};
use chainspy_std::{
    intercept::{RuleConflict, Rules},
    registry::Subscription,
};
use std::sync::LazyLock;

static GLOBAL: LazyLock<Spy> = LazyLock::new(Spy::new);

/// The process-wide [`Spy`].
pub fn global() -> &'static Spy {
    &GLOBAL
}

/// Drop every global observer and interception rule.
pub fn reset() {
    global().reset();
}

/// Subscribe to every chain delivered through the global instance.
pub fn subscribe<F, R>(f: F) -> Subscription
where
    F: Fn(&Chain, &Detail) -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    global().subscribe(f)
}

/// Subscribe to every error record reported through the global instance.
pub fn subscribe_error<F, R>(f: F) -> Subscription
where
    F: Fn(&ErrorRecord) -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    global().subscribe_error(f)
}

/// Merge rules into the global rule tree.
pub fn intercept(rules: Rules) -> Vec<RuleConflict> {
    global().intercept(rules)
}

/// See [`Spy::broadcast`].
pub fn broadcast(chain: impl IntoChain, detail: Detail) {
    global().broadcast(chain, detail);
}

/// See [`Spy::broadcast_error`].
pub fn broadcast_error(record: ErrorRecord) {
    global().broadcast_error(record);
}

/// See [`Spy::send`].
pub fn send(chain: impl IntoChain) {
    global().send(chain);
}

/// See [`Spy::send_with`].
pub fn send_with(chain: impl IntoChain, detail: Detail) {
    global().send_with(chain, detail);
}

/// See [`Spy::send_from`].
pub fn send_from<T: Traced>(component: &T, fragment: impl IntoChain) {
    global().send_from(component, fragment);
}

/// See [`Spy::error`].
pub fn error(chain: impl IntoChain, error: impl Into<BoxError>) {
    global().error(chain, error);
}

/// See [`Spy::error_from`].
pub fn error_from<T: Traced>(component: &T, fragment: impl IntoChain, error: impl Into<BoxError>) {
    global().error_from(component, fragment, error);
}
