//! # chainspy-std
//!
//! Standard implementations for the chainspy event tracing layer.
//!
//! This crate provides:
//! - **Observer registry**: [`observers::ObserverRegistry`] with
//!   [`registry::Subscription`] tokens
//! - **Interception**: [`intercept::Rules`], [`intercept::RuleTrie`] and the
//!   shared [`intercept::InterceptEngine`]
//! - **Failure isolation**: [`isolate::PanicPolicy`]
//! - **Standard observers**: [`hooks::LoggingObserver`]
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use chainspy_core;

// Modules
pub mod hooks;
pub mod intercept;
pub mod isolate;
pub mod observers;
pub mod registry;
pub mod testing;
