//! Callback return value conversions.

use crate::error::BoxError;

/// What an interceptor or a per-node handler decided about a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    /// Let the original chain continue to the observers.
    #[default]
    Deliver,
    /// Drop the original chain. Anything the callback force-delivered still counts.
    Suppress,
}

impl Verdict {
    /// Returns `true` for [`Verdict::Suppress`].
    pub const fn is_suppress(self) -> bool {
        matches!(self, Verdict::Suppress)
    }
}

/// Trait for converting an interceptor's or handler's return value into a [`Verdict`].
///
/// # Default Implementations
///
/// - `()` → Deliver
/// - `bool` → `false` = Suppress, `true` = Deliver
/// - `Verdict` → As is
/// - `Option<T>` → `None` = Deliver, otherwise delegates to `T`
/// - `Result<T, E>` → Delegates to inner `T` or reports the error
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be turned into a `Verdict`",
    label = "missing `IntoVerdict` implementation",
    note = "Return `()`, `bool`, `Verdict`, or a `Result` of one of those."
)]
pub trait IntoVerdict {
    /// Convert the output into a verdict or an error.
    fn into_verdict(self) -> Result<Verdict, BoxError>;
}

impl IntoVerdict for () {
    fn into_verdict(self) -> Result<Verdict, BoxError> {
        Ok(Verdict::Deliver)
    }
}

impl IntoVerdict for bool {
    fn into_verdict(self) -> Result<Verdict, BoxError> {
        Ok(if self {
            Verdict::Deliver
        } else {
            Verdict::Suppress
        })
    }
}

impl IntoVerdict for Verdict {
    fn into_verdict(self) -> Result<Verdict, BoxError> {
        Ok(self)
    }
}

impl<T: IntoVerdict> IntoVerdict for Option<T> {
    fn into_verdict(self) -> Result<Verdict, BoxError> {
        match self {
            Some(t) => t.into_verdict(),
            None => Ok(Verdict::Deliver),
        }
    }
}

impl<T, E> IntoVerdict for Result<T, E>
where
    T: IntoVerdict,
    E: Into<BoxError>,
{
    fn into_verdict(self) -> Result<Verdict, BoxError> {
        match self {
            Ok(t) => t.into_verdict(),
            Err(e) => Err(e.into()),
        }
    }
}

/// Trait for converting an observer's return value into success or failure.
///
/// Observers may return `()` or a `Result<(), E>`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid observer return type",
    label = "missing `IntoOutcome` implementation",
    note = "Observers must return `()` or `Result<(), E>`."
)]
pub trait IntoOutcome {
    /// Convert the output into success or an error.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> IntoOutcome for Result<(), E> {
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}
