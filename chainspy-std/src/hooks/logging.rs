//! Logging observer for chain tracing.

use chainspy_core::{BoxError, Chain, Detail, ErrorObserver, ErrorRecord, Observer};

/// An observer that logs every delivered chain and error record.
///
/// Subscribe it on both paths to mirror all traffic into `tracing`:
///
/// ```rust
/// use chainspy_std::{hooks::LoggingObserver, observers::ObserverRegistry};
///
/// let registry = ObserverRegistry::new();
/// registry.subscribe_observer(LoggingObserver);
/// registry.subscribe_error_observer(LoggingObserver);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl Observer for LoggingObserver {
    fn on_chain(&self, chain: &Chain, detail: &Detail) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(%chain, ?detail, "chain delivered");
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = (chain, detail);
        }
        Ok(())
    }
}

impl ErrorObserver for LoggingObserver {
    fn on_error(&self, record: &ErrorRecord) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::error!(chain = %record.chain, error = %record.error, info = ?record.info, "error recorded");
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = record;
        }
        Ok(())
    }
}
