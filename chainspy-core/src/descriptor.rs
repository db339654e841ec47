//! Per-component identity records.
//!
//! A binding layer stores one [`Descriptor`] next to every instrumented
//! component. The descriptor answers three questions for the chain resolver:
//! what is this component called, does it stop upward resolution (host), and
//! does it want to veto a chain before it leaves its own scope (handle).

use crate::{
    chain::Chain,
    delivery::LocalSend,
    error::BoxError,
    outcome::{IntoVerdict, Verdict},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    fmt,
    ops::{Deref, DerefMut},
    sync::Arc,
};

/// Property name read for a component's identifier when none is configured.
pub const DEFAULT_PROP_NAME: &str = "spyId";

/// Readable view of a component's current properties (or context).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(Map<String, Value>);

impl Props {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Add a property, returning the updated set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl Deref for Props {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Props {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for Props {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Computes an identifier from `(props, context)`.
pub type IdFn = Arc<dyn Fn(&Props, &Props) -> Option<String> + Send + Sync>;

/// Per-node veto applied to a fully resolved chain.
pub type HandleFn = Arc<dyn Fn(&Chain) -> Result<Verdict, BoxError> + Send + Sync>;

/// Spy attached to a named component callback, run before the original callback.
///
/// Receives a send handle scoped to the component, the callback arguments and
/// the component's current properties.
pub type Callback = Arc<dyn Fn(&LocalSend<'_>, &[Value], &Props) + Send + Sync>;

/// Where a component's identifier comes from when the designated property is absent.
#[derive(Clone, Default)]
pub enum IdSource {
    /// No fallback; the property is the only source.
    #[default]
    None,
    /// A literal fixed when the component type was instrumented.
    Static(String),
    /// Computed from the component's current properties and context.
    Computed(IdFn),
}

impl fmt::Debug for IdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdSource::None => f.write_str("None"),
            IdSource::Static(id) => f.debug_tuple("Static").field(id).finish(),
            IdSource::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Identity descriptor of an instrumented component.
///
/// # Example
///
/// ```rust
/// use chainspy_core::{Descriptor, Props};
///
/// let descriptor = Descriptor::new()
///     .with_id("login-form")
///     .with_listen(["mount", "click"]);
///
/// // The designated property wins over the configured literal.
/// let props = Props::new().with("spyId", "signup-form");
/// assert_eq!(descriptor.resolve_id(&props, &Props::new()).as_deref(), Some("signup-form"));
/// assert_eq!(descriptor.resolve_id(&Props::new(), &Props::new()).as_deref(), Some("login-form"));
/// assert!(descriptor.listens("click"));
/// ```
#[derive(Clone)]
pub struct Descriptor {
    id: IdSource,
    prop_name: String,
    host: bool,
    listen: Vec<String>,
    handle: Option<HandleFn>,
    callbacks: BTreeMap<String, Callback>,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Descriptor {
    /// Create a descriptor reading its id from the `spyId` property only.
    pub fn new() -> Self {
        Self {
            id: IdSource::None,
            prop_name: DEFAULT_PROP_NAME.to_owned(),
            host: false,
            listen: Vec::new(),
            handle: None,
            callbacks: BTreeMap::new(),
        }
    }

    /// Use a static identifier when the property is absent.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = IdSource::Static(id.into());
        self
    }

    /// Compute the identifier from `(props, context)` when the property is absent.
    #[must_use]
    pub fn with_id_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Props, &Props) -> Option<String> + Send + Sync + 'static,
    {
        self.id = IdSource::Computed(Arc::new(f));
        self
    }

    /// Read the identifier from a different property.
    #[must_use]
    pub fn with_prop_name(mut self, name: impl Into<String>) -> Self {
        self.prop_name = name.into();
        self
    }

    /// Mark the component as a host boundary.
    #[must_use]
    pub fn with_host(mut self, host: bool) -> Self {
        self.host = host;
        self
    }

    /// Set the ordered list of locally listened event names.
    #[must_use]
    pub fn with_listen<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.listen = names.into_iter().map(Into::into).collect();
        self
    }

    /// Install a per-node handler that may veto chains leaving this component.
    ///
    /// The handler's return value converts through [`IntoVerdict`]: returning
    /// `false` stops delivery.
    #[must_use]
    pub fn with_handle<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&Chain) -> R + Send + Sync + 'static,
        R: IntoVerdict,
    {
        self.handle = Some(Arc::new(move |chain: &Chain| f(chain).into_verdict()));
        self
    }

    /// Spy on the component callback called `name`.
    #[must_use]
    pub fn with_callback<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&LocalSend<'_>, &[Value], &Props) + Send + Sync + 'static,
    {
        self.callbacks.insert(name.into(), Arc::new(f));
        self
    }

    /// Resolve the identifier for the given properties and context.
    ///
    /// The designated property is read first; a null or missing value falls
    /// back to the configured [`IdSource`].
    pub fn resolve_id(&self, props: &Props, context: &Props) -> Option<String> {
        if let Some(id) = props.get(&self.prop_name).and_then(segment_from_value) {
            return Some(id);
        }

        match &self.id {
            IdSource::None => None,
            IdSource::Static(id) => Some(id.clone()),
            IdSource::Computed(f) => f(props, context),
        }
    }

    /// The identifier source used when the property is absent.
    pub fn id_source(&self) -> &IdSource {
        &self.id
    }

    /// The property the identifier is read from.
    pub fn prop_name(&self) -> &str {
        &self.prop_name
    }

    /// Whether chains sent from this component's descendants stop here.
    pub fn is_host(&self) -> bool {
        self.host
    }

    /// The locally listened event names, in registration order.
    pub fn listen(&self) -> &[String] {
        &self.listen
    }

    /// Check whether `name` is in the listen list.
    pub fn listens(&self, name: &str) -> bool {
        self.listen.iter().any(|listened| listened == name)
    }

    /// Run the per-node handler. Without one, every chain is delivered.
    pub fn handle(&self, chain: &Chain) -> Result<Verdict, BoxError> {
        match &self.handle {
            Some(handle) => handle(chain),
            None => Ok(Verdict::Deliver),
        }
    }

    /// The spy attached to the callback called `name`.
    pub fn callback(&self, name: &str) -> Option<&Callback> {
        self.callbacks.get(name)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id)
            .field("prop_name", &self.prop_name)
            .field("host", &self.host)
            .field("listen", &self.listen)
            .field("handle", &self.handle.is_some())
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn segment_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A component type with a static identity descriptor.
///
/// Usually derived with `#[derive(Instrumented)]` from `chainspy-macros`.
pub trait Instrumented {
    /// The descriptor shared by every instance of this type.
    fn descriptor() -> Descriptor;
}
