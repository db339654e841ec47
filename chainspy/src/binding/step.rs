//! Named steps inside a host component.
//!
//! A step has no identity of its own. It reports through the node that hosts
//! it as `[..host chain, name, "enter"]` and `[..host chain, name, "leave"]`;
//! either suffix can be replaced.

use super::tree::{ComponentTree, NodeId, TreeError};
use chainspy_core::{Chain, IntoChain};

/// Default suffix sent when a step becomes active.
pub const ENTER: &str = "enter";
/// Default suffix sent when a step stops being active.
pub const LEAVE: &str = "leave";

/// A named stage of a multi-step flow (wizard page, checkout stage, ...).
///
/// # Example
///
/// ```rust
/// use chainspy::{Descriptor, Props, Spy, binding::{ComponentTree, Step}};
///
/// let mut tree = ComponentTree::new(Spy::new());
/// let wizard = tree.mount(None, Descriptor::new().with_id("signup"), Props::new()).unwrap();
///
/// let account = Step::new("account");
/// let profile = Step::new("profile").with_enter(["open", "profile-form"]);
///
/// account.enter(&tree, wizard).unwrap();
/// // Sends ["signup", "account", "leave"] then ["signup", "profile", "open", "profile-form"].
/// account.transition(&tree, wizard, &profile).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    name: String,
    enter: Chain,
    leave: Chain,
}

impl Step {
    /// A step sending `enter` and `leave` suffixes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enter: Chain::root(ENTER),
            leave: Chain::root(LEAVE),
        }
    }

    /// Replace the suffix sent on enter.
    #[must_use]
    pub fn with_enter(mut self, fragment: impl IntoChain) -> Self {
        self.enter = fragment.into_chain();
        self
    }

    /// Replace the suffix sent on leave.
    #[must_use]
    pub fn with_leave(mut self, fragment: impl IntoChain) -> Self {
        self.leave = fragment.into_chain();
        self
    }

    /// The step name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fragment sent on enter.
    pub fn enter_fragment(&self) -> Chain {
        Chain::root(self.name.as_str()).concat(&self.enter)
    }

    /// Fragment sent on leave.
    pub fn leave_fragment(&self) -> Chain {
        Chain::root(self.name.as_str()).concat(&self.leave)
    }

    /// Report that the step became active inside `host`.
    pub fn enter(&self, tree: &ComponentTree, host: NodeId) -> Result<(), TreeError> {
        tree.send(host, self.enter_fragment())
    }

    /// Report that the step stopped being active inside `host`.
    pub fn leave(&self, tree: &ComponentTree, host: NodeId) -> Result<(), TreeError> {
        tree.send(host, self.leave_fragment())
    }

    /// Switch from this step to `next`.
    ///
    /// Sends this step's leave and then `next`'s enter, but only when the
    /// names differ; re-rendering the same step reports nothing.
    pub fn transition(
        &self,
        tree: &ComponentTree,
        host: NodeId,
        next: &Step,
    ) -> Result<(), TreeError> {
        if self.name == next.name {
            return Ok(());
        }
        self.leave(tree, host)?;
        next.enter(tree, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spy::Spy;
    use chainspy_core::{Descriptor, Props};
    use chainspy_std::testing::RecordingObserver;

    fn wizard() -> (ComponentTree, NodeId, RecordingObserver) {
        let spy = Spy::new();
        let recorder = RecordingObserver::new();
        spy.subscribe_observer(recorder.clone());
        let mut tree = ComponentTree::new(spy);
        let host = tree
            .mount(None, Descriptor::new().with_id("wizard"), Props::new())
            .unwrap();
        (tree, host, recorder)
    }

    #[test]
    fn test_enter_and_leave() {
        let (tree, host, recorder) = wizard();
        let step = Step::new("intro");

        step.enter(&tree, host).unwrap();
        step.leave(&tree, host).unwrap();

        assert_eq!(
            recorder.chains(),
            [
                Chain::from(["wizard", "intro", "enter"]),
                Chain::from(["wizard", "intro", "leave"])
            ]
        );
    }

    #[test]
    fn test_transition_only_on_name_change() {
        let (tree, host, recorder) = wizard();
        let first = Step::new("one").with_leave("done");
        let same = Step::new("one");
        let second = Step::new("two").with_enter(["shown", "fast"]);

        first.transition(&tree, host, &same).unwrap();
        assert_eq!(recorder.count(), 0);

        first.transition(&tree, host, &second).unwrap();
        assert_eq!(
            recorder.chains(),
            [
                Chain::from(["wizard", "one", "done"]),
                Chain::from(["wizard", "two", "shown", "fast"])
            ]
        );
    }

    #[test]
    fn test_untraceable_host_reports_nothing() {
        let spy = Spy::new();
        let recorder = RecordingObserver::new();
        spy.subscribe_observer(recorder.clone());
        let mut tree = ComponentTree::new(spy);
        let anonymous = tree.mount(None, Descriptor::new(), Props::new()).unwrap();

        Step::new("intro").enter(&tree, anonymous).unwrap();
        assert_eq!(recorder.count(), 0);
    }
}
