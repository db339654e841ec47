//! # chainspy-core
//!
//! Core types and capability traits for the chainspy event tracing layer.
//!
//! This crate has minimal dependencies and is meant to be imported by binding
//! layers (UI toolkits, test harnesses) that only need to describe components
//! and resolve chains, without pulling in the registry and interception engine
//! from `chainspy-std`.
//!
//! # Pipeline
//!
//! An instrumented component fires a local event. The chain resolver walks the
//! component's ancestors and builds a [`Chain`] such as `["form", "field", "click"]`.
//! The broadcast facade then asks the interception engine for an
//! [`Interceptor`], which may rewrite, suppress or pass the chain, and finally
//! fans the chain out to every registered [`Observer`].
//!
//! ## Data
//!
//! - [`Chain`]: ordered root-to-leaf segments, built by concatenation.
//! - [`Detail`]: opaque JSON payload attached to one broadcast.
//! - [`ErrorRecord`]: chain + error + optional info, delivered to [`ErrorObserver`]s.
//!
//! ## Capabilities
//!
//! - [`Traced`]: anything that can name itself and its nearest instrumented
//!   ancestor. [`resolve_chain`] turns one into a [`Chain`].
//! - [`Descriptor`]: per-component identity record a binding layer stores
//!   next to each node.
//!
//! ## Decisions
//!
//! - [`Verdict`]: what an interceptor or per-node handler decided.
//! - [`IntoVerdict`] / [`IntoOutcome`]: conversions from callback return values.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod chain;
mod delivery;
mod descriptor;
mod detail;
mod error;
mod interceptor;
mod observer;
mod outcome;
mod traced;

pub use chain::{Chain, IntoChain};
pub use delivery::{Delivery, LocalSend, Publish};
pub use descriptor::{
    Callback, DEFAULT_PROP_NAME, Descriptor, HandleFn, IdFn, IdSource, Instrumented, Props,
};
pub use detail::Detail;
pub use error::{BoxError, CallbackError, ErrorRecord, Stage};
pub use interceptor::{Interceptor, UNCAUGHT};
pub use observer::{ErrorObserver, Observer};
pub use outcome::{IntoOutcome, IntoVerdict, Verdict};
pub use traced::{Traced, resolve_chain, resolve_id};
