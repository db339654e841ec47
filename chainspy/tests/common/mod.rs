#![allow(dead_code)]

use chainspy::{
    Descriptor, Props, Spy,
    binding::{ComponentTree, NodeId},
    testing::{RecordingErrorObserver, RecordingObserver},
};
use std::sync::Once;

// ============================================================================
// Logging
// ============================================================================

static INIT: Once = Once::new();

/// Route `tracing` output through the test harness. `RUST_LOG` controls the level.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Fixtures
// ============================================================================

pub struct Harness {
    pub spy: Spy,
    pub chains: RecordingObserver,
    pub errors: RecordingErrorObserver,
}

impl Harness {
    pub fn new() -> Self {
        init_logging();
        let spy = Spy::new();
        let chains = RecordingObserver::new();
        let errors = RecordingErrorObserver::new();
        spy.subscribe_observer(chains.clone());
        spy.subscribe_error_observer(errors.clone());
        Self {
            spy,
            chains,
            errors,
        }
    }

    pub fn tree(&self) -> ComponentTree {
        ComponentTree::new(self.spy.clone())
    }
}

pub fn named(id: &str) -> Descriptor {
    Descriptor::new().with_id(id)
}

/// Mount `ids` as a single path, root first, returning every node.
pub fn mount_path(tree: &mut ComponentTree, ids: &[&str]) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = Vec::new();
    for id in ids {
        let parent = nodes.last().copied();
        let node = tree.mount(parent, named(id), Props::new()).unwrap();
        nodes.push(node);
    }
    nodes
}
