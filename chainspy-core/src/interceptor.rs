//! # Interception Layer (Interceptor)
//!
//! An interceptor is bound to a path in the interception rule tree and runs
//! before a matching chain reaches the observers. It can:
//!
//! - Observe the chain and let it through (return `()` or `true`)
//! - Rewrite it: force-deliver a transformed chain through the
//!   [`Delivery`] handle, then suppress the original (return `false`)
//! - Drop it entirely (return `false` without delivering anything)
//!
//! Any return value other than a suppress verdict means the original chain is
//! delivered through the normal path after the interceptor ran.

use crate::{
    chain::Chain,
    delivery::Delivery,
    detail::Detail,
    error::BoxError,
    outcome::{IntoVerdict, Verdict},
};

/// Rule-tree key that holds the fallback interceptor of a subtree.
///
/// The fallback runs for any chain that entered the subtree but matched no
/// more specific leaf.
pub const UNCAUGHT: &str = "<UNCAUGHT>";

/// A rule-bound function that can observe, rewrite, re-deliver or suppress a chain.
///
/// Closures with the signature `Fn(&Delivery<'_>, &Chain, &Detail) -> R`,
/// where `R: IntoVerdict`, implement this trait automatically.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Interceptor`",
    label = "missing `Interceptor` implementation",
    note = "Interceptors are `Fn(&Delivery<'_>, &Chain, &Detail) -> impl IntoVerdict` closures or implement `intercept` directly."
)]
pub trait Interceptor: Send + Sync + 'static {
    /// Decide what happens to `chain`.
    fn intercept(
        &self,
        delivery: &Delivery<'_>,
        chain: &Chain,
        detail: &Detail,
    ) -> Result<Verdict, BoxError>;
}

impl<F, R> Interceptor for F
where
    F: Fn(&Delivery<'_>, &Chain, &Detail) -> R + Send + Sync + 'static,
    R: IntoVerdict,
{
    fn intercept(
        &self,
        delivery: &Delivery<'_>,
        chain: &Chain,
        detail: &Detail,
    ) -> Result<Verdict, BoxError> {
        (self)(delivery, chain, detail).into_verdict()
    }
}
