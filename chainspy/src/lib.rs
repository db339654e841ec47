//! # chainspy - Event Tracing for Component Trees
//!
//! Instrumented components announce named events. Each event bubbles into a
//! hierarchical chain such as `["form", "field", "click"]`, is optionally
//! intercepted or rewritten by rules, and is finally broadcast to observers.
//!
//! ## Quick Start
//!
//! ```rust
//! use chainspy::prelude::*;
//!
//! let spy = Spy::new();
//! spy.subscribe(|chain: &Chain, detail: &Detail| {
//!     println!("{chain} {detail:?}");
//! });
//!
//! // Rewrite everything under `legacy` and drop the original.
//! spy.intercept(Rules::new().on("legacy", |delivery: &Delivery<'_>, chain: &Chain, _: &Detail| {
//!     delivery.send(Chain::root("modern").concat(&chain[1..]));
//!     false
//! }));
//!
//! spy.send(["legacy", "button", "click"]);
//! ```
//!
//! ## Layers
//!
//! - [`Spy`]: the broadcast facade and tracing context (observers + rules)
//! - [`global()`] and the free functions: the process-wide context
//! - [`binding`]: a component tree that maintains ancestor links and reports
//!   lifecycle events, local events and errors through a [`Spy`]
//! - [`Traced`]: the capability chain resolution needs from a component

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod config;
mod global;
mod spy;

pub mod binding;

// Data
pub use chainspy_core::{Chain, Detail, IntoChain, Props};

// Errors
pub use chainspy_core::{BoxError, CallbackError, ErrorRecord, Stage};

// Descriptors and chain resolution
pub use chainspy_core::{
    Callback, DEFAULT_PROP_NAME, Descriptor, HandleFn, IdFn, IdSource, Instrumented, LocalSend,
    Traced, resolve_chain, resolve_id,
};

// Interception
pub use chainspy_core::{Delivery, Interceptor, IntoVerdict, Publish, UNCAUGHT, Verdict};

// Observers
pub use chainspy_core::{ErrorObserver, IntoOutcome, Observer};

// Registry, interception and isolation
pub use chainspy_std::{
    intercept::{ConflictKind, RuleConflict, Rules},
    isolate::PanicPolicy,
    registry::{Subscription, SubscriptionGuard, SubscriptionId},
};

pub use config::{SpyConfig, UNKNOWN_SEGMENT};
pub use global::{
    broadcast, broadcast_error, error, error_from, global, intercept, reset, send, send_from,
    send_with, subscribe, subscribe_error,
};
pub use spy::Spy;

/// Standard observer implementations.
pub mod hooks {
    pub use chainspy_std::hooks::LoggingObserver;
}

/// Testing utilities.
pub mod testing {
    pub use chainspy_std::testing::{
        RecordedError, RecordingErrorObserver, RecordingInterceptor, RecordingObserver,
    };
}

/// Prelude module - common imports for chainspy.
///
/// # Usage
///
/// ```rust
/// use chainspy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Chain, Delivery, Descriptor, Detail, ErrorRecord, Instrumented, IntoChain,
        Props, Rules, Spy, SpyConfig, Subscription, Traced, UNCAUGHT, Verdict,
        binding::{ComponentTree, NodeId, Step},
    };
}

#[cfg(feature = "macros")]
pub use chainspy_macros::Instrumented;
