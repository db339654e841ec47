//! Callback middleware.
//!
//! A descriptor may carry a spy for a named component callback. Instead of
//! patching the component, the binding layer wraps the callback once at
//! binding time; the wrapper runs the spy and then the original.

use super::tree::{ComponentTree, NodeId};
use chainspy_core::{Chain, Detail, LocalSend};
use serde_json::Value;

impl ComponentTree {
    /// Decorate `original` with the spy the node's descriptor registered for `name`.
    ///
    /// On every call the spy receives a send handle scoped to the node, the
    /// call arguments and the node's current properties; then `original`
    /// runs and its result is returned. Without a registered spy, or once the
    /// node is unmounted, only `original` runs.
    pub fn wrap_callback<'t, F, R>(
        &'t self,
        node: NodeId,
        name: &str,
        original: F,
    ) -> impl Fn(&[Value]) -> R + use<'t, F, R>
    where
        F: Fn(&[Value]) -> R + 't,
    {
        let spy_fn = self
            .get(node)
            .and_then(|view| view.descriptor().callback(name).cloned());

        move |args: &[Value]| {
            if let Some(spy_fn) = &spy_fn {
                if let Some(view) = self.get(node) {
                    let scoped = |fragment: Chain, detail: Detail| {
                        self.spy().send_from_with(&view, fragment, detail);
                    };
                    spy_fn(&LocalSend::new(&scoped), args, view.props());
                }
            }
            original(args)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::spy::Spy;
    use chainspy_core::{Chain, Descriptor, Detail, LocalSend, Props};
    use chainspy_std::testing::RecordingObserver;
    use serde_json::{Value, json};
    use std::cell::Cell;

    use super::ComponentTree;

    fn record_value(send: &LocalSend<'_>, args: &[Value], props: &Props) {
        let detail = Detail::new()
            .with("value", args.first().cloned().unwrap_or(Value::Null))
            .with("name", props.get("name").cloned().unwrap_or(Value::Null));
        send.send_with("change", detail);
    }

    #[test]
    fn test_spy_runs_before_original() {
        let spy = Spy::new();
        let recorder = RecordingObserver::new();
        spy.subscribe_observer(recorder.clone());
        let mut tree = ComponentTree::new(spy);

        let input = tree
            .mount(
                None,
                Descriptor::new()
                    .with_id("input")
                    .with_callback("on_change", record_value),
                Props::new().with("name", "email"),
            )
            .unwrap();

        let calls = Cell::new(0);
        let on_change = tree.wrap_callback(input, "on_change", |args: &[Value]| {
            calls.set(calls.get() + 1);
            args.len()
        });

        assert_eq!(on_change(&[json!("a@b.c")]), 1);
        assert_eq!(calls.get(), 1);

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, ["input", "change"]);
        assert_eq!(events[0].1.get("value"), Some(&json!("a@b.c")));
        assert_eq!(events[0].1.get("name"), Some(&json!("email")));
    }

    #[test]
    fn test_unspied_callback_is_passed_through() {
        let spy = Spy::new();
        let recorder = RecordingObserver::new();
        spy.subscribe_observer(recorder.clone());
        let mut tree = ComponentTree::new(spy);
        let node = tree
            .mount(None, Descriptor::new().with_id("plain"), Props::new())
            .unwrap();

        let wrapped = tree.wrap_callback(node, "on_click", |_: &[Value]| "done");
        assert_eq!(wrapped(&[]), "done");
        assert_eq!(recorder.chains(), Vec::<Chain>::new());
    }
}
