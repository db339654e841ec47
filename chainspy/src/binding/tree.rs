//! Arena-backed component tree.

use crate::spy::Spy;
use chainspy_core::{
    BoxError, Chain, Descriptor, Detail, Instrumented, IntoChain, Props, Traced, Verdict,
    resolve_chain,
};
use std::{fmt, sync::Arc};
use thiserror::Error;

/// Event name sent after a listening node is mounted.
pub const MOUNT: &str = "mount";
/// Event name sent before a listening node is unmounted.
pub const UNMOUNT: &str = "unmount";
/// Event name that marks a node as an error boundary.
pub const ERROR: &str = "error";

/// Generational handle to a mounted node.
///
/// A handle to an unmounted node never aliases a node mounted later in the
/// same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Errors from tree mutations and node-scoped sends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The handle does not refer to a mounted node.
    #[error("node {0} is not mounted")]
    UnknownNode(NodeId),

    /// The move would make a node its own ancestor.
    #[error("cannot move node {node} under its own descendant {parent}")]
    Cycle {
        /// The node being moved.
        node: NodeId,
        /// The requested new parent.
        parent: NodeId,
    },
}

struct Node {
    descriptor: Arc<Descriptor>,
    props: Props,
    context: Props,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Entry {
    generation: u32,
    node: Option<Node>,
}

/// Component tree maintained by a binding layer.
///
/// The tree owns the ancestor links; chain resolution only ever reads them.
/// Every node carries its own [`Descriptor`], current properties and
/// context. Mount, unmount, node-scoped sends and error boundaries all go
/// through the tree's [`Spy`].
///
/// # Example
///
/// ```rust
/// use chainspy::{Chain, Descriptor, Detail, Props, Spy, binding::ComponentTree};
/// use std::sync::{Arc, Mutex};
///
/// let spy = Spy::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// spy.subscribe(move |chain: &Chain, _: &Detail| sink.lock().unwrap().push(chain.clone()));
///
/// let mut tree = ComponentTree::new(spy);
/// let form = tree.mount(None, Descriptor::new().with_id("form"), Props::new()).unwrap();
/// let field = tree
///     .mount(Some(form), Descriptor::new().with_listen(["mount"]), Props::new().with("spyId", "email"))
///     .unwrap();
///
/// tree.send(field, "change").unwrap();
/// assert_eq!(
///     *seen.lock().unwrap(),
///     [Chain::from(["form", "email", "mount"]), Chain::from(["form", "email", "change"])]
/// );
/// ```
pub struct ComponentTree {
    spy: Spy,
    entries: Vec<Entry>,
    free: Vec<usize>,
    len: usize,
}

impl ComponentTree {
    /// Create an empty tree reporting through `spy`.
    pub fn new(spy: Spy) -> Self {
        Self {
            spy,
            entries: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// The context this tree reports through.
    pub fn spy(&self) -> &Spy {
        &self.spy
    }

    /// Number of mounted nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no node is mounted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `id` refers to a mounted node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.entries
            .get(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.entries
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_mut())
            .ok_or(TreeError::UnknownNode(id))
    }

    fn check(&self, id: NodeId) -> Result<(), TreeError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(id))
        }
    }

    /// A read view of a mounted node.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        let node = self.node(id)?;
        Some(NodeRef {
            tree: self,
            id,
            node,
        })
    }

    /// The parent of a mounted node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// The children of a mounted node, in mount order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Mount a node under `parent` (or as a root).
    ///
    /// When the descriptor listens for `mount`, the node's `mount` chain is
    /// sent once it is attached.
    pub fn mount(
        &mut self,
        parent: Option<NodeId>,
        descriptor: Descriptor,
        props: Props,
    ) -> Result<NodeId, TreeError> {
        if let Some(parent) = parent {
            self.check(parent)?;
        }

        let listens_mount = descriptor.listens(MOUNT);
        let node = Node {
            descriptor: Arc::new(descriptor),
            props,
            context: Props::new(),
            parent,
            children: Vec::new(),
        };

        let id = match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.node = Some(node);
                NodeId {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.entries.len() - 1,
                    generation: 0,
                }
            }
        };
        self.len += 1;

        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(id);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(node = %id, parent = ?parent, "mounted");

        if listens_mount {
            self.send(id, MOUNT)?;
        }
        Ok(id)
    }

    /// Mount a node described by an [`Instrumented`] type.
    pub fn mount_instrumented<T: Instrumented>(
        &mut self,
        parent: Option<NodeId>,
        props: Props,
    ) -> Result<NodeId, TreeError> {
        self.mount(parent, T::descriptor(), props)
    }

    /// Unmount a node together with its whole subtree.
    ///
    /// Nodes listening for `unmount` send it before anything is detached,
    /// parents before children, so every chain still resolves in full.
    pub fn unmount(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.check(id)?;

        let mut subtree = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            subtree.push(current);
            stack.extend(self.children(current).iter().rev());
        }

        for &node in &subtree {
            if let Some(view) = self.get(node).filter(|view| view.descriptor().listens(UNMOUNT)) {
                self.spy.send_from(&view, UNMOUNT);
            }
        }

        if let Some(parent) = self.parent(id) {
            self.node_mut(parent)?.children.retain(|child| *child != id);
        }

        for node in subtree {
            let entry = &mut self.entries[node.index];
            entry.node = None;
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(node.index);
            self.len -= 1;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(node = %id, "unmounted");
        Ok(())
    }

    /// Move a node (and its subtree) under a new parent, or make it a root.
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), TreeError> {
        self.check(id)?;
        if let Some(new_parent) = parent {
            self.check(new_parent)?;

            let mut cursor = Some(new_parent);
            while let Some(current) = cursor {
                if current == id {
                    return Err(TreeError::Cycle {
                        node: id,
                        parent: new_parent,
                    });
                }
                cursor = self.parent(current);
            }
        }

        if let Some(old) = self.parent(id) {
            self.node_mut(old)?.children.retain(|child| *child != id);
        }
        self.node_mut(id)?.parent = parent;
        if let Some(new_parent) = parent {
            self.node_mut(new_parent)?.children.push(id);
        }
        Ok(())
    }

    /// Replace a node's properties.
    pub fn set_props(&mut self, id: NodeId, props: Props) -> Result<(), TreeError> {
        self.node_mut(id)?.props = props;
        Ok(())
    }

    /// Replace a node's context.
    pub fn set_context(&mut self, id: NodeId, context: Props) -> Result<(), TreeError> {
        self.node_mut(id)?.context = context;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Node-scoped reporting
    // ------------------------------------------------------------------------

    /// Send `fragment` scoped to a node. See [`Spy::send_from`].
    pub fn send(&self, id: NodeId, fragment: impl IntoChain) -> Result<(), TreeError> {
        self.send_with(id, fragment, Detail::new())
    }

    /// Send `fragment` scoped to a node with a detail.
    pub fn send_with(
        &self,
        id: NodeId,
        fragment: impl IntoChain,
        detail: Detail,
    ) -> Result<(), TreeError> {
        let view = self.get(id).ok_or(TreeError::UnknownNode(id))?;
        self.spy.send_from_with(&view, fragment, detail);
        Ok(())
    }

    /// Report an error scoped to a node. See [`Spy::error_from`].
    pub fn error(
        &self,
        id: NodeId,
        fragment: impl IntoChain,
        error: impl Into<BoxError>,
    ) -> Result<(), TreeError> {
        let view = self.get(id).ok_or(TreeError::UnknownNode(id))?;
        self.spy.error_from(&view, fragment, error);
        Ok(())
    }

    /// Deliver a locally fired event from the innermost node listening for it.
    ///
    /// The walk starts at `target` and climbs ancestors. The first node whose
    /// listen list contains `name` sends `[..its chain, name]`. Lifecycle
    /// names are never dispatched this way. Returns the node that sent.
    pub fn dispatch_event(&self, target: NodeId, name: &str) -> Result<Option<NodeId>, TreeError> {
        let mut cursor = Some(self.get(target).ok_or(TreeError::UnknownNode(target))?);
        if matches!(name, MOUNT | UNMOUNT | ERROR) {
            return Ok(None);
        }

        while let Some(view) = cursor {
            if view.descriptor().listens(name) {
                self.spy.send_from(&view, name);
                return Ok(Some(view.id()));
            }
            cursor = view.ancestor();
        }
        Ok(None)
    }

    /// Route an error raised inside `origin` to its nearest error boundary.
    ///
    /// The boundary is the closest strict ancestor listening for `error`; the
    /// record carries the boundary's chain. Returns the boundary, or `None`
    /// when no ancestor catches errors (nothing is reported then).
    pub fn catch_error(
        &self,
        origin: NodeId,
        error: impl Into<BoxError>,
        info: Option<Detail>,
    ) -> Result<Option<NodeId>, TreeError> {
        let origin = self.get(origin).ok_or(TreeError::UnknownNode(origin))?;

        let mut cursor = origin.ancestor();
        while let Some(view) = cursor {
            if view.descriptor().listens(ERROR) {
                match info {
                    Some(info) => self.spy.error_from_with(&view, Chain::new(), error, info),
                    None => self.spy.error_from(&view, Chain::new(), error),
                }
                return Ok(Some(view.id()));
            }
            cursor = view.ancestor();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(node = %origin.id(), "error raised outside any boundary");
        Ok(None)
    }
}

impl fmt::Debug for ComponentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTree")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Read view of one mounted node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a ComponentTree,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    /// The node's handle.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's identity descriptor.
    pub fn descriptor(&self) -> &'a Descriptor {
        &self.node.descriptor
    }

    /// The node's current properties.
    pub fn props(&self) -> &'a Props {
        &self.node.props
    }

    /// The node's current context.
    pub fn context(&self) -> &'a Props {
        &self.node.context
    }

    /// The node's resolved chain.
    pub fn chain(&self) -> Chain {
        resolve_chain(self)
    }
}

impl Traced for NodeRef<'_> {
    fn spy_id(&self) -> Option<String> {
        self.node
            .descriptor
            .resolve_id(&self.node.props, &self.node.context)
    }

    fn is_host(&self) -> bool {
        self.node.descriptor.is_host()
    }

    fn ancestor(&self) -> Option<Self> {
        self.tree.get(self.node.parent?)
    }

    fn handle(&self, chain: &Chain) -> Result<Verdict, BoxError> {
        self.node.descriptor.handle(chain)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("descriptor", &self.node.descriptor)
            .field("props", &self.node.props)
            .finish()
    }
}
