//! Per-callback failure isolation.
//!
//! Every user callback (observer, interceptor, per-node handler) runs through
//! [`PanicPolicy::run`]. An `Err` return always becomes a
//! [`CallbackError::Failed`]; a panic becomes [`CallbackError::Panicked`]
//! under [`PanicPolicy::Isolate`] and unwinds normally under
//! [`PanicPolicy::Propagate`].
//!
//! `AssertUnwindSafe` is used, so a callback that panics while holding one of
//! its own locks can leave that state poisoned. The registries recover from
//! poisoning on their side.

use chainspy_core::{BoxError, CallbackError, Stage};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

/// What happens when a user callback panics during delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanicPolicy {
    /// Catch the panic and report it like a returned error.
    #[default]
    Isolate,
    /// Let the panic unwind to the caller of `broadcast`.
    Propagate,
}

impl PanicPolicy {
    /// Run one callback belonging to `stage`.
    pub fn run<T, F>(self, stage: Stage, f: F) -> Result<T, CallbackError>
    where
        F: FnOnce() -> Result<T, BoxError>,
    {
        let result = match self {
            PanicPolicy::Propagate => f(),
            PanicPolicy::Isolate => match panic::catch_unwind(AssertUnwindSafe(f)) {
                Ok(result) => result,
                Err(payload) => {
                    return Err(CallbackError::Panicked {
                        stage,
                        message: panic_message(payload.as_ref()),
                    });
                }
            },
        };

        result.map_err(|source| CallbackError::Failed { stage, source })
    }
}

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through() {
        let value = PanicPolicy::Isolate.run(Stage::Observer, || Ok(3));
        assert_eq!(value.unwrap(), 3);
    }

    #[test]
    fn test_error_is_wrapped_with_stage() {
        let err = PanicPolicy::Propagate
            .run::<(), _>(Stage::Interceptor, || Err("nope".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            CallbackError::Failed {
                stage: Stage::Interceptor,
                ..
            }
        ));
        assert_eq!(err.to_string(), "interceptor failed: nope");
    }

    #[test]
    fn test_panic_is_caught_when_isolated() {
        let err = PanicPolicy::Isolate
            .run::<(), _>(Stage::Handler, || panic!("handler exploded"))
            .unwrap_err();
        match err {
            CallbackError::Panicked { stage, message } => {
                assert_eq!(stage, Stage::Handler);
                assert_eq!(message, "handler exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_formatted_panic_message() {
        let id = 7;
        let err = PanicPolicy::Isolate
            .run::<(), _>(Stage::Observer, || panic!("observer {id} failed"))
            .unwrap_err();
        assert_eq!(err.to_string(), "observer panicked: observer 7 failed");
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn test_panic_unwinds_when_propagating() {
        let _ = PanicPolicy::Propagate.run::<(), _>(Stage::Observer, || panic!("boom"));
    }
}
