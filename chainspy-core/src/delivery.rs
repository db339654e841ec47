//! Send handles passed into user callbacks.

use crate::{
    chain::{Chain, IntoChain},
    detail::Detail,
};
use std::fmt;

/// Final delivery of a chain to the observers.
///
/// Implemented by the observer registry. Publishing never consults
/// interception rules.
pub trait Publish: Send + Sync {
    /// Deliver `chain` and `detail` to every current observer.
    fn publish(&self, chain: &Chain, detail: &Detail);
}

/// Unconditional delivery handle given to interceptors.
///
/// Chains sent through a `Delivery` go straight to the observers and are not
/// intercepted again, so an interceptor can rewrite a chain without seeing
/// its own output.
///
/// # Example
///
/// ```rust
/// use chainspy_core::{Chain, Delivery, Detail, Verdict};
///
/// fn rename(delivery: &Delivery<'_>, chain: &Chain, detail: &Detail) -> Verdict {
///     delivery.send_with(chain.with("!"), detail.clone());
///     Verdict::Suppress
/// }
/// ```
#[derive(Clone, Copy)]
pub struct Delivery<'a> {
    sink: &'a dyn Publish,
}

impl<'a> Delivery<'a> {
    /// Wrap a publisher.
    pub fn new(sink: &'a dyn Publish) -> Self {
        Self { sink }
    }

    /// Deliver a chain with an empty detail.
    pub fn send(&self, chain: impl IntoChain) {
        self.sink.publish(&chain.into_chain(), &Detail::new());
    }

    /// Deliver a chain with the given detail.
    pub fn send_with(&self, chain: impl IntoChain, detail: Detail) {
        self.sink.publish(&chain.into_chain(), &detail);
    }
}

impl fmt::Debug for Delivery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery").finish_non_exhaustive()
    }
}

/// Send handle scoped to one component.
///
/// The fragment passed to [`LocalSend::send`] is appended to the component's
/// resolved chain, exactly as if the component had fired the event itself.
#[derive(Clone, Copy)]
pub struct LocalSend<'a> {
    sink: &'a dyn Fn(Chain, Detail),
}

impl<'a> LocalSend<'a> {
    /// Wrap a scoped send function.
    pub fn new(sink: &'a dyn Fn(Chain, Detail)) -> Self {
        Self { sink }
    }

    /// Send a fragment with an empty detail.
    pub fn send(&self, fragment: impl IntoChain) {
        (self.sink)(fragment.into_chain(), Detail::new());
    }

    /// Send a fragment with the given detail.
    pub fn send_with(&self, fragment: impl IntoChain, detail: Detail) {
        (self.sink)(fragment.into_chain(), detail);
    }
}

impl fmt::Debug for LocalSend<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSend").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<Chain>>);

    impl Publish for Collect {
        fn publish(&self, chain: &Chain, _detail: &Detail) {
            self.0.lock().unwrap().push(chain.clone());
        }
    }

    #[test]
    fn test_delivery_forwards_to_sink() {
        let sink = Collect::default();
        let delivery = Delivery::new(&sink);
        delivery.send("a");
        delivery.send_with(["b", "c"], Detail::new().with("k", true));

        let seen = sink.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], ["b", "c"]);
    }

    #[test]
    fn test_local_send_passes_fragment() {
        let seen = Mutex::new(Vec::new());
        let sink = |fragment: Chain, _detail: Detail| seen.lock().unwrap().push(fragment);
        let local = LocalSend::new(&sink);
        local.send(["wow", "click"]);

        assert_eq!(seen.lock().unwrap()[0], ["wow", "click"]);
    }
}
