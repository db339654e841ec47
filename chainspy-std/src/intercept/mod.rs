//! Interception engine.
//!
//! Rules are built with [`Rules`], merged into a [`RuleTrie`], and looked up
//! per broadcast through the shared [`InterceptEngine`].

mod rules;
mod trie;

pub use rules::Rules;
pub use trie::{ConflictKind, RuleConflict, RuleTrie};

use chainspy_core::{Chain, Interceptor};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared, mutable rule tree.
///
/// Lookups clone the matching interceptor out of the read lock, so an
/// interceptor may register further rules or broadcast again while it runs.
#[derive(Debug, Default)]
pub struct InterceptEngine {
    trie: RwLock<RuleTrie>,
}

impl InterceptEngine {
    /// Create an engine with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `rules` into the tree. Replaced registrations are returned and logged.
    pub fn register(&self, rules: Rules) -> Vec<RuleConflict> {
        self.trie
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(rules)
    }

    /// Find the interceptor responsible for `chain`.
    pub fn resolve(&self, chain: &Chain) -> Option<Arc<dyn Interceptor>> {
        self.trie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .find(chain)
            .cloned()
    }

    /// Remove every rule.
    pub fn clear(&self) {
        self.trie
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Whether no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.trie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainspy_core::{Delivery, Detail, Publish, Verdict};

    struct Nowhere;

    impl Publish for Nowhere {
        fn publish(&self, _chain: &Chain, _detail: &Detail) {}
    }

    #[test]
    fn test_interceptor_can_register_while_running() {
        let engine = Arc::new(InterceptEngine::new());
        let inner = engine.clone();
        engine.register(Rules::new().on(
            "grow",
            move |_: &Delivery<'_>, _: &Chain, _: &Detail| {
                inner.register(Rules::new().on("grown", |_: &Delivery<'_>, _: &Chain, _: &Detail| {}));
            },
        ));

        let interceptor = engine.resolve(&Chain::root("grow")).unwrap();
        let verdict = interceptor
            .intercept(&Delivery::new(&Nowhere), &Chain::root("grow"), &Detail::new())
            .unwrap();

        assert_eq!(verdict, Verdict::Deliver);
        assert!(engine.resolve(&Chain::root("grown")).is_some());
    }

    #[test]
    fn test_clear_removes_rules() {
        let engine = InterceptEngine::new();
        engine.register(Rules::at(["a"], |_: &Delivery<'_>, _: &Chain, _: &Detail| false));
        assert!(!engine.is_empty());

        engine.clear();
        assert!(engine.is_empty());
        assert!(engine.resolve(&Chain::root("a")).is_none());
    }
}
