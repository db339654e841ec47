//! Runtime configuration of a [`Spy`](crate::Spy).

use chainspy_std::isolate::PanicPolicy;

/// Root segment substituted on the error path when a component has no identity.
pub const UNKNOWN_SEGMENT: &str = "UNKNOWN";

/// Settings fixed when a [`Spy`](crate::Spy) is created.
///
/// # Example
///
/// ```rust
/// use chainspy::{PanicPolicy, Spy, SpyConfig};
///
/// let spy = Spy::with_config(
///     SpyConfig::new()
///         .with_unknown_segment("ANONYMOUS")
///         .with_panic_policy(PanicPolicy::Propagate),
/// );
/// assert_eq!(spy.config().unknown_segment(), "ANONYMOUS");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpyConfig {
    unknown_segment: String,
    panic_policy: PanicPolicy,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            unknown_segment: UNKNOWN_SEGMENT.to_owned(),
            panic_policy: PanicPolicy::default(),
        }
    }
}

impl SpyConfig {
    /// Default configuration: `UNKNOWN` root segment, panics isolated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the root segment used for errors from untraceable components.
    #[must_use]
    pub fn with_unknown_segment(mut self, segment: impl Into<String>) -> Self {
        self.unknown_segment = segment.into();
        self
    }

    /// Choose how panics in user callbacks are handled.
    #[must_use]
    pub fn with_panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.panic_policy = policy;
        self
    }

    /// The root segment used for errors from untraceable components.
    pub fn unknown_segment(&self) -> &str {
        &self.unknown_segment
    }

    /// How panics in user callbacks are handled.
    pub fn panic_policy(&self) -> PanicPolicy {
        self.panic_policy
    }
}
