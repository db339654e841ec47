//! Testing utilities for chainspy.
//!
//! Recorders share their storage between clones, so a test can keep one
//! handle and subscribe the other.
//!
//! # Features
//!
//! - [`RecordingObserver`]: records every delivered chain and detail
//! - [`RecordingErrorObserver`]: records every error record it receives
//! - [`RecordingInterceptor`]: records intercepted chains and returns a fixed verdict

use chainspy_core::{
    BoxError, Chain, Delivery, Detail, ErrorObserver, ErrorRecord, Interceptor, Observer, Stage,
    Verdict,
};
use std::sync::{Arc, Mutex, PoisonError};

// ============================================================================
// Recording Observer
// ============================================================================

/// An observer that records all chains it receives.
///
/// # Example
///
/// ```rust
/// use chainspy_core::{Chain, Detail};
/// use chainspy_std::{observers::ObserverRegistry, testing::RecordingObserver};
///
/// let recorder = RecordingObserver::new();
/// let registry = ObserverRegistry::new();
/// registry.subscribe_observer(recorder.clone());
///
/// registry.publish(&Chain::from(["a", "b"]), &Detail::new());
/// assert_eq!(recorder.chains(), [Chain::from(["a", "b"])]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<(Chain, Detail)>>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(chain, detail)` pairs, in delivery order.
    pub fn events(&self) -> Vec<(Chain, Detail)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded chains, in delivery order.
    pub fn chains(&self) -> Vec<Chain> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(chain, _)| chain.clone())
            .collect()
    }

    /// Number of recorded deliveries.
    pub fn count(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Observer for RecordingObserver {
    fn on_chain(&self, chain: &Chain, detail: &Detail) -> Result<(), BoxError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((chain.clone(), detail.clone()));
        Ok(())
    }
}

// ============================================================================
// Recording Error Observer
// ============================================================================

/// A snapshot of one [`ErrorRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedError {
    /// The record's chain.
    pub chain: Chain,
    /// The error rendered with `Display`.
    pub message: String,
    /// The stage of the failing callback, when the record carries a callback failure.
    pub stage: Option<Stage>,
    /// The record's extra information.
    pub info: Option<Detail>,
}

/// An error observer that records all error records it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingErrorObserver {
    records: Arc<Mutex<Vec<RecordedError>>>,
}

impl RecordingErrorObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded errors, in delivery order.
    pub fn records(&self) -> Vec<RecordedError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded errors.
    pub fn count(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ErrorObserver for RecordingErrorObserver {
    fn on_error(&self, record: &ErrorRecord) -> Result<(), BoxError> {
        let recorded = RecordedError {
            chain: record.chain.clone(),
            message: record.error.to_string(),
            stage: record.callback_error().map(|err| err.stage()),
            info: record.info.clone(),
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);
        Ok(())
    }
}

// ============================================================================
// Recording Interceptor
// ============================================================================

/// An interceptor that records the chains it sees and returns a fixed verdict.
#[derive(Debug, Clone, Default)]
pub struct RecordingInterceptor {
    chains: Arc<Mutex<Vec<Chain>>>,
    verdict: Verdict,
}

impl RecordingInterceptor {
    /// Create a recorder that lets every chain through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder that returns `verdict`.
    pub fn with_verdict(verdict: Verdict) -> Self {
        Self {
            chains: Arc::default(),
            verdict,
        }
    }

    /// Intercepted chains, in order.
    pub fn chains(&self) -> Vec<Chain> {
        self.chains
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of intercepted chains.
    pub fn count(&self) -> usize {
        self.chains
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Interceptor for RecordingInterceptor {
    fn intercept(
        &self,
        _delivery: &Delivery<'_>,
        chain: &Chain,
        _detail: &Detail,
    ) -> Result<Verdict, BoxError> {
        self.chains
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(chain.clone());
        Ok(self.verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{intercept::Rules, observers::ObserverRegistry};

    #[test]
    fn test_recorders_share_storage_between_clones() {
        let recorder = RecordingObserver::new();
        let registry = ObserverRegistry::new();
        registry.subscribe_observer(recorder.clone());

        registry.publish(&Chain::root("a"), &Detail::new().with("n", 1));
        assert_eq!(recorder.count(), 1);
        assert_eq!(recorder.events()[0].1.get("n"), Some(&serde_json::json!(1)));

        recorder.clear();
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_error_recorder_captures_stage() {
        let errors = RecordingErrorObserver::new();
        let registry = ObserverRegistry::new();
        registry.subscribe_error_observer(errors.clone());
        registry.subscribe(|_: &Chain, _: &Detail| -> Result<(), BoxError> { Err("nope".into()) });

        registry.publish(&Chain::root("a"), &Detail::new());

        let records = errors.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stage, Some(Stage::Observer));
        assert_eq!(records[0].message, "observer failed: nope");
    }

    #[test]
    fn test_recording_interceptor_in_rules() {
        let interceptor = RecordingInterceptor::with_verdict(Verdict::Suppress);
        let rules = Rules::new().on_interceptor("a", interceptor.clone());
        assert_eq!(rules.len(), 1);
        assert_eq!(interceptor.count(), 0);
    }
}
