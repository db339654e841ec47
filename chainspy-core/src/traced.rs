//! Chain resolution over any parent-linked component tree.

use crate::{chain::Chain, error::BoxError, outcome::Verdict};

/// A component handle that can name itself and step to its parent.
///
/// Binding layers implement this for their node handle type. `ancestor`
/// returns the immediate parent whether or not the parent is instrumented;
/// resolution skips ancestors that have no identifier.
pub trait Traced: Sized {
    /// The component's resolved identifier, if it has one.
    fn spy_id(&self) -> Option<String>;

    /// Whether resolution from a descendant stops at this component.
    fn is_host(&self) -> bool {
        false
    }

    /// The immediate parent component.
    fn ancestor(&self) -> Option<Self>;

    /// Per-node veto applied to a chain this component is about to send.
    fn handle(&self, _chain: &Chain) -> Result<Verdict, BoxError> {
        Ok(Verdict::Deliver)
    }
}

/// The component's own identifier.
pub fn resolve_id<T: Traced>(component: &T) -> Option<String> {
    component.spy_id()
}

/// Resolve the full scoped chain of a component, root first.
///
/// The walk starts at the component itself and climbs ancestors, collecting
/// each identified one. It stops at the first host ancestor, so chains sent
/// from below a host never show what lies above it. The component's own host
/// flag does not cut its own chain. A component without an identifier
/// resolves to the empty chain regardless of its ancestors.
///
/// # Example
///
/// ```rust
/// use chainspy_core::{Traced, resolve_chain};
///
/// #[derive(Clone)]
/// struct Node(Vec<(Option<&'static str>, bool)>);
///
/// impl Traced for Node {
///     fn spy_id(&self) -> Option<String> {
///         self.0.last()?.0.map(str::to_owned)
///     }
///     fn is_host(&self) -> bool {
///         self.0.last().is_some_and(|(_, host)| *host)
///     }
///     fn ancestor(&self) -> Option<Self> {
///         let mut path = self.0.clone();
///         path.pop();
///         (!path.is_empty()).then_some(Node(path))
///     }
/// }
///
/// let qux = Node(vec![(Some("foo"), false), (Some("bar"), false), (Some("qux"), false)]);
/// assert_eq!(resolve_chain(&qux), ["foo", "bar", "qux"]);
/// ```
pub fn resolve_chain<T: Traced>(component: &T) -> Chain {
    let Some(own) = component.spy_id() else {
        return Chain::new();
    };

    let mut segments = vec![own];
    let mut cursor = component.ancestor();
    while let Some(node) = cursor {
        if let Some(id) = node.spy_id() {
            segments.push(id);
        }
        if node.is_host() {
            break;
        }
        cursor = node.ancestor();
    }

    segments.reverse();
    Chain::from(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    struct Entry {
        id: Option<&'static str>,
        host: bool,
        parent: Option<usize>,
    }

    #[derive(Clone, Copy)]
    struct Node<'a> {
        tree: &'a [Entry],
        index: usize,
    }

    impl Traced for Node<'_> {
        fn spy_id(&self) -> Option<String> {
            self.tree[self.index].id.map(str::to_owned)
        }

        fn is_host(&self) -> bool {
            self.tree[self.index].host
        }

        fn ancestor(&self) -> Option<Self> {
            let parent = self.tree[self.index].parent?;
            Some(Node {
                tree: self.tree,
                index: parent,
            })
        }
    }

    const fn entry(id: Option<&'static str>, host: bool, parent: Option<usize>) -> Entry {
        Entry { id, host, parent }
    }

    #[test]
    fn test_chain_is_root_first() {
        let tree = [
            entry(Some("foo"), false, None),
            entry(Some("bar"), false, Some(0)),
            entry(Some("qux"), false, Some(1)),
        ];
        let qux = Node { tree: &tree, index: 2 };
        assert_eq!(resolve_chain(&qux), ["foo", "bar", "qux"]);
        assert_eq!(resolve_id(&qux).as_deref(), Some("qux"));
    }

    #[test]
    fn test_host_stops_resolution() {
        let tree = [
            entry(Some("app"), false, None),
            entry(Some("widget"), true, Some(0)),
            entry(Some("button"), false, Some(1)),
        ];
        assert_eq!(
            resolve_chain(&Node { tree: &tree, index: 2 }),
            ["widget", "button"]
        );
        assert_eq!(
            resolve_chain(&Node { tree: &tree, index: 1 }),
            ["app", "widget"]
        );
    }

    #[test]
    fn test_unidentified_ancestors_are_skipped() {
        let tree = [
            entry(Some("page"), false, None),
            entry(None, false, Some(0)),
            entry(Some("link"), false, Some(1)),
        ];
        assert_eq!(resolve_chain(&Node { tree: &tree, index: 2 }), ["page", "link"]);
    }

    #[test]
    fn test_unidentified_component_has_empty_chain() {
        let tree = [entry(Some("page"), false, None), entry(None, false, Some(0))];
        assert!(resolve_chain(&Node { tree: &tree, index: 1 }).is_empty());
    }

    #[test]
    fn test_unidentified_host_still_stops() {
        let tree = [
            entry(Some("outer"), false, None),
            entry(None, true, Some(0)),
            entry(Some("inner"), false, Some(1)),
        ];
        assert_eq!(resolve_chain(&Node { tree: &tree, index: 2 }), ["inner"]);
    }
}
