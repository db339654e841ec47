//! # Observation Layer (Observer)
//!
//! Observers are the final recipients of a broadcast. They are passive: their
//! return value only signals whether they themselves failed, it never changes
//! what other observers see.

use crate::{
    chain::Chain,
    detail::Detail,
    error::{BoxError, ErrorRecord},
    outcome::IntoOutcome,
};

/// A success-path subscriber, invoked with every delivered chain.
///
/// Closures `Fn(&Chain, &Detail)` returning `()` or `Result<(), E>` implement
/// this trait automatically.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Observer`",
    label = "missing `Observer` implementation",
    note = "Observers are `Fn(&Chain, &Detail)` closures or implement `on_chain` directly."
)]
pub trait Observer: Send + Sync + 'static {
    /// Called once per delivered chain.
    fn on_chain(&self, chain: &Chain, detail: &Detail) -> Result<(), BoxError>;
}

impl<F, R> Observer for F
where
    F: Fn(&Chain, &Detail) -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    fn on_chain(&self, chain: &Chain, detail: &Detail) -> Result<(), BoxError> {
        (self)(chain, detail).into_outcome()
    }
}

/// An error-path subscriber, invoked with every published [`ErrorRecord`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `ErrorObserver`",
    label = "missing `ErrorObserver` implementation",
    note = "Error observers are `Fn(&ErrorRecord)` closures or implement `on_error` directly."
)]
pub trait ErrorObserver: Send + Sync + 'static {
    /// Called once per published error record.
    fn on_error(&self, record: &ErrorRecord) -> Result<(), BoxError>;
}

impl<F, R> ErrorObserver for F
where
    F: Fn(&ErrorRecord) -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    fn on_error(&self, record: &ErrorRecord) -> Result<(), BoxError> {
        (self)(record).into_outcome()
    }
}
