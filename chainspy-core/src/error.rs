//! Error types for chainspy.
//!
//! - [`BoxError`] - Boxed user error carried by error records
//! - [`CallbackError`] - Failure of a user-supplied observer, interceptor or handler
//! - [`ErrorRecord`] - What error observers receive

use crate::{chain::Chain, detail::Detail};
use std::fmt;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The delivery stage a user callback was running in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// A success-path observer.
    Observer,
    /// An error observer.
    ErrorObserver,
    /// An interception rule.
    Interceptor,
    /// A component's own per-node handler.
    Handler,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Observer => "observer",
            Stage::ErrorObserver => "error observer",
            Stage::Interceptor => "interceptor",
            Stage::Handler => "handler",
        })
    }
}

/// A user-supplied callback failed during delivery.
#[derive(Error, Debug)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("{stage} failed: {source}")]
    Failed {
        /// Where the callback was running.
        stage: Stage,
        /// The error it returned.
        #[source]
        source: BoxError,
    },

    /// The callback panicked.
    #[error("{stage} panicked: {message}")]
    Panicked {
        /// Where the callback was running.
        stage: Stage,
        /// The panic payload, when it was a string.
        message: String,
    },
}

impl CallbackError {
    /// The stage the failing callback belonged to.
    pub fn stage(&self) -> Stage {
        match self {
            CallbackError::Failed { stage, .. } | CallbackError::Panicked { stage, .. } => *stage,
        }
    }
}

/// A structured error delivered to error observers.
#[derive(Debug)]
pub struct ErrorRecord {
    /// The chain the error is attributed to.
    pub chain: Chain,
    /// The error itself.
    pub error: BoxError,
    /// Optional extra information (for example a component stack).
    pub info: Option<Detail>,
}

impl ErrorRecord {
    /// Create a record without extra information.
    pub fn new(chain: Chain, error: impl Into<BoxError>) -> Self {
        Self {
            chain,
            error: error.into(),
            info: None,
        }
    }

    /// Attach extra information.
    #[must_use]
    pub fn with_info(mut self, info: Detail) -> Self {
        self.info = Some(info);
        self
    }

    /// Returns the callback failure carried by this record, if that is what it holds.
    pub fn callback_error(&self) -> Option<&CallbackError> {
        self.error.downcast_ref::<CallbackError>()
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.chain, self.error)
    }
}
