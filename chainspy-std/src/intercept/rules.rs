//! Nested interception rule structure.

use chainspy_core::{Chain, Delivery, Detail, Interceptor, IntoVerdict, UNCAUGHT};
use std::{fmt, sync::Arc};

pub(crate) enum RuleEntry {
    Leaf(Arc<dyn Interceptor>),
    Scope(Rules),
}

/// A nested rule structure, merged into the rule tree with
/// [`RuleTrie::merge`](super::RuleTrie::merge).
///
/// Entries are kept in the order they were added; within one `Rules` value
/// a later entry for the same path counts as a conflict just like a later
/// registration would.
///
/// # Example
///
/// ```rust
/// use chainspy_core::{Chain, Delivery, Detail};
/// use chainspy_std::intercept::Rules;
///
/// let rules = Rules::new().scope(
///     "login-form",
///     Rules::new()
///         .on("login", |_: &Delivery<'_>, _: &Chain, _: &Detail| true)
///         .uncaught(|delivery: &Delivery<'_>, chain: &Chain, _: &Detail| {
///             delivery.send(chain.with("UNCAUGHT"));
///             false
///         }),
/// );
/// assert_eq!(rules.len(), 1);
/// ```
#[derive(Default)]
pub struct Rules {
    pub(crate) entries: Vec<(String, RuleEntry)>,
}

impl Rules {
    /// Create an empty rule structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a leaf interceptor closure to `segment`.
    ///
    /// Binding to [`UNCAUGHT`] is the same as calling [`uncaught`](Self::uncaught).
    #[must_use]
    pub fn on<F, R>(self, segment: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Delivery<'_>, &Chain, &Detail) -> R + Send + Sync + 'static,
        R: IntoVerdict,
    {
        self.on_interceptor(segment, f)
    }

    /// Bind an [`Interceptor`] implementation to `segment`.
    #[must_use]
    pub fn on_interceptor<I: Interceptor>(mut self, segment: impl Into<String>, interceptor: I) -> Self {
        self.entries
            .push((segment.into(), RuleEntry::Leaf(Arc::new(interceptor))));
        self
    }

    /// Nest a subtree under `segment`.
    #[must_use]
    pub fn scope(mut self, segment: impl Into<String>, rules: Rules) -> Self {
        self.entries.push((segment.into(), RuleEntry::Scope(rules)));
        self
    }

    /// Set the fallback for chains that enter this subtree without matching a leaf.
    #[must_use]
    pub fn uncaught<F, R>(self, f: F) -> Self
    where
        F: Fn(&Delivery<'_>, &Chain, &Detail) -> R + Send + Sync + 'static,
        R: IntoVerdict,
    {
        self.on_interceptor(UNCAUGHT, f)
    }

    /// Build nested scopes along `path` and bind `f` at its end.
    ///
    /// `Rules::at(["a", "b"], f)` is `Rules::new().scope("a", Rules::new().on("b", f))`.
    /// An empty path binds the root fallback.
    pub fn at<P, S, F, R>(path: P, f: F) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Delivery<'_>, &Chain, &Detail) -> R + Send + Sync + 'static,
        R: IntoVerdict,
    {
        let mut segments: Vec<String> = path.into_iter().map(Into::into).collect();
        let Some(last) = segments.pop() else {
            return Rules::new().uncaught(f);
        };

        segments
            .into_iter()
            .rev()
            .fold(Rules::new().on(last, f), |inner, segment| {
                Rules::new().scope(segment, inner)
            })
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (segment, entry) in &self.entries {
            match entry {
                RuleEntry::Leaf(_) => map.entry(segment, &"<interceptor>"),
                RuleEntry::Scope(rules) => map.entry(segment, rules),
            };
        }
        map.finish()
    }
}
