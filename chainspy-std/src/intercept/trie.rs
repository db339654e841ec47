//! Segment trie holding interceptors and uncaught fallbacks.

use super::rules::{RuleEntry, Rules};
use chainspy_core::{Chain, Interceptor, UNCAUGHT};
use std::{collections::HashMap, fmt, sync::Arc};
use thiserror::Error;

/// What a conflicting registration replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A leaf interceptor at the same path.
    Leaf,
    /// The uncaught fallback of the same subtree.
    Uncaught,
}

/// A registration that replaced an existing interceptor.
///
/// Conflicts are not fatal; the later registration is the one kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("interceptor at `{path}` redefined")]
pub struct RuleConflict {
    /// The full path of the replaced interceptor. Uncaught fallbacks end in
    /// [`UNCAUGHT`].
    pub path: Chain,
    /// What was replaced.
    pub kind: ConflictKind,
}

#[derive(Default)]
struct Slot {
    leaf: Option<Arc<dyn Interceptor>>,
    scope: Option<RuleNode>,
}

#[derive(Default)]
struct RuleNode {
    uncaught: Option<Arc<dyn Interceptor>>,
    slots: HashMap<String, Slot>,
}

impl RuleNode {
    fn merge(&mut self, rules: Rules, path: &Chain, conflicts: &mut Vec<RuleConflict>) {
        for (segment, entry) in rules.entries {
            match entry {
                RuleEntry::Leaf(interceptor) if segment == UNCAUGHT => {
                    if self.uncaught.replace(interceptor).is_some() {
                        conflicts.push(RuleConflict {
                            path: path.with(UNCAUGHT),
                            kind: ConflictKind::Uncaught,
                        });
                    }
                }
                RuleEntry::Leaf(interceptor) => {
                    let full = path.with(segment.as_str());
                    let slot = self.slots.entry(segment).or_default();
                    if slot.leaf.replace(interceptor).is_some() {
                        conflicts.push(RuleConflict {
                            path: full,
                            kind: ConflictKind::Leaf,
                        });
                    }
                }
                RuleEntry::Scope(inner) => {
                    let full = path.with(segment.as_str());
                    let slot = self.slots.entry(segment).or_default();
                    slot.scope
                        .get_or_insert_with(RuleNode::default)
                        .merge(inner, &full, conflicts);
                }
            }
        }
    }

    fn find<'a>(
        &'a self,
        segments: &[String],
        fallback: Option<&'a Arc<dyn Interceptor>>,
    ) -> Option<&'a Arc<dyn Interceptor>> {
        let fallback = self.uncaught.as_ref().or(fallback);

        let Some((head, rest)) = segments.split_first() else {
            return fallback;
        };
        let Some(slot) = self.slots.get(head) else {
            return fallback;
        };

        if !rest.is_empty() {
            if let Some(hit) = slot.scope.as_ref().and_then(|scope| scope.find(rest, None)) {
                return Some(hit);
            }
        }

        slot.leaf.as_ref().or(fallback)
    }

    fn count(&self) -> usize {
        let own = usize::from(self.uncaught.is_some());
        self.slots.values().fold(own, |total, slot| {
            total
                + usize::from(slot.leaf.is_some())
                + slot.scope.as_ref().map_or(0, RuleNode::count)
        })
    }
}

/// Interception rule tree.
///
/// Each segment may carry a leaf interceptor and a nested subtree at the same
/// time; each subtree may carry an uncaught fallback.
///
/// Resolution walks the chain one segment at a time:
///
/// 1. A node's uncaught fallback becomes the best fallback seen so far.
/// 2. If the segment has a subtree and more segments follow, the subtree is
///    searched first; a deeper leaf or deeper fallback found there wins.
/// 3. Otherwise a leaf on the segment owns the rest of the chain.
/// 4. Otherwise the best fallback seen so far is returned.
#[derive(Default)]
pub struct RuleTrie {
    root: RuleNode,
}

impl RuleTrie {
    /// Create an empty rule tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `rules` into the tree, returning every replaced registration.
    ///
    /// Each conflict is also logged as a warning.
    pub fn merge(&mut self, rules: Rules) -> Vec<RuleConflict> {
        let mut conflicts = Vec::new();
        self.root.merge(rules, &Chain::new(), &mut conflicts);

        #[cfg(feature = "tracing")]
        {
            for conflict in &conflicts {
                tracing::warn!(path = %conflict.path, kind = ?conflict.kind, "interception rule redefined");
            }
        }

        conflicts
    }

    /// Find the interceptor responsible for `chain`.
    pub fn find(&self, chain: &Chain) -> Option<&Arc<dyn Interceptor>> {
        self.root.find(chain.segments(), None)
    }

    /// Number of registered interceptors, fallbacks included.
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Whether no interceptor is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every rule.
    pub fn clear(&mut self) {
        self.root = RuleNode::default();
    }
}

impl fmt::Debug for RuleTrie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTrie")
            .field("interceptors", &self.len())
            .finish()
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

    /// Reports its own name as an error so lookups can be told apart.
    struct Named(&'static str);

    impl Interceptor for Named {
        fn intercept(
            &self,
            _delivery: &Delivery<'_>,
            _chain: &Chain,
            _detail: &Detail,
        ) -> Result<Verdict, chainspy_core::BoxError> {
            Err(self.0.into())
        }
    }

    fn name_of(trie: &RuleTrie, chain: &[&str]) -> Option<String> {
        let interceptor = trie.find(&Chain::from(chain))?;
        let err = interceptor
            .intercept(&Delivery::new(&Nowhere), &Chain::new(), &Detail::new())
            .unwrap_err();
        Some(err.to_string())
    }

    fn precedence_trie() -> RuleTrie {
        let mut trie = RuleTrie::new();
        let conflicts = trie.merge(
            Rules::new().on_interceptor("x", Named("x")).scope(
                "x",
                Rules::new()
                    .on_interceptor("y", Named("x.y"))
                    .on_interceptor(UNCAUGHT, Named("x.uncaught")),
            ),
        );
        assert!(conflicts.is_empty());
        trie
    }

    #[test]
    fn test_deeper_leaf_wins() {
        let trie = precedence_trie();
        assert_eq!(name_of(&trie, &["x", "y"]).as_deref(), Some("x.y"));
    }

    #[test]
    fn test_subtree_fallback_beats_shallower_leaf() {
        let trie = precedence_trie();
        assert_eq!(name_of(&trie, &["x", "z"]).as_deref(), Some("x.uncaught"));
    }

    #[test]
    fn test_single_segment_uses_leaf() {
        let trie = precedence_trie();
        assert_eq!(name_of(&trie, &["x"]).as_deref(), Some("x"));
    }

    #[test]
    fn test_leaf_owns_longer_chains() {
        let mut trie = RuleTrie::new();
        trie.merge(Rules::new().on_interceptor("a", Named("a")));
        assert_eq!(name_of(&trie, &["a", "b", "c"]).as_deref(), Some("a"));
        assert_eq!(name_of(&trie, &["b"]), None);
    }

    #[test]
    fn test_root_fallback_catches_everything_unmatched() {
        let mut trie = RuleTrie::new();
        trie.merge(
            Rules::new()
                .on_interceptor(UNCAUGHT, Named("root"))
                .scope("a", Rules::new().on_interceptor("b", Named("a.b"))),
        );

        assert_eq!(name_of(&trie, &["a", "b"]).as_deref(), Some("a.b"));
        assert_eq!(name_of(&trie, &["a", "c"]).as_deref(), Some("root"));
        assert_eq!(name_of(&trie, &["a"]).as_deref(), Some("root"));
        assert_eq!(name_of(&trie, &["q"]).as_deref(), Some("root"));
    }

    #[test]
    fn test_deeper_fallback_overrides_shallower() {
        let mut trie = RuleTrie::new();
        trie.merge(Rules::new().on_interceptor(UNCAUGHT, Named("root")).scope(
            "a",
            Rules::new().scope("b", Rules::new().on_interceptor(UNCAUGHT, Named("a.b.uncaught"))),
        ));

        assert_eq!(name_of(&trie, &["a", "b", "z"]).as_deref(), Some("a.b.uncaught"));
        // The subtree is only entered when segments remain after `b`.
        assert_eq!(name_of(&trie, &["a", "b"]).as_deref(), Some("root"));
    }

    #[test]
    fn test_merge_is_additive_and_reports_conflicts() {
        let mut trie = RuleTrie::new();
        trie.merge(Rules::at(["a", "b"], |_: &Delivery<'_>, _: &Chain, _: &Detail| {}));
        let conflicts = trie.merge(
            Rules::new()
                .scope("a", Rules::new().on_interceptor("b", Named("second")))
                .scope("a", Rules::new().on_interceptor("c", Named("c"))),
        );

        assert_eq!(
            conflicts,
            [RuleConflict {
                path: Chain::from(["a", "b"]),
                kind: ConflictKind::Leaf,
            }]
        );
        assert_eq!(name_of(&trie, &["a", "b"]).as_deref(), Some("second"));
        assert_eq!(name_of(&trie, &["a", "c"]).as_deref(), Some("c"));
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn test_uncaught_conflict_path() {
        let mut trie = RuleTrie::new();
        trie.merge(Rules::new().scope("a", Rules::new().on_interceptor(UNCAUGHT, Named("one"))));
        let conflicts =
            trie.merge(Rules::new().scope("a", Rules::new().on_interceptor(UNCAUGHT, Named("two"))));

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Uncaught);
        assert_eq!(conflicts[0].path, ["a", UNCAUGHT]);
        assert_eq!(conflicts[0].to_string(), "interceptor at `a.<UNCAUGHT>` redefined");
    }

    #[test]
    fn test_clear() {
        let mut trie = precedence_trie();
        assert_eq!(trie.len(), 3);
        trie.clear();
        assert!(trie.is_empty());
        assert_eq!(name_of(&trie, &["x"]), None);
    }
}
