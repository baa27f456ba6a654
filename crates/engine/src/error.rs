//! Engine-level error union.

use thiserror::Error;

use salesdoc_core::DomainError;

use crate::invoicing::InvoiceServiceError;
use crate::rates::RateError;
use crate::store::StoreError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of a lifecycle operation.
///
/// Domain failures pass through unchanged so callers can match on the typed
/// guard violations; collaborator failures are wrapped per collaborator.
/// Store-level optimistic-concurrency failures surface as `Conflict`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Concurrent-modification detected at commit time.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The document store failed for a non-concurrency reason.
    #[error("document store failure: {0}")]
    Store(StoreError),

    /// The currency-rate source could not produce a rate.
    #[error("exchange rate lookup failed: {0}")]
    Rate(String),

    /// The invoice-creation collaborator failed. Nothing was stored on the
    /// source document; the conversion may be retried.
    #[error("invoice creation failed: {0}")]
    Invoice(String),
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => EngineError::Conflict(msg),
            StoreError::NotFound => EngineError::Domain(DomainError::NotFound),
            other => EngineError::Store(other),
        }
    }
}

impl From<RateError> for EngineError {
    fn from(value: RateError) -> Self {
        EngineError::Rate(value.to_string())
    }
}

impl From<InvoiceServiceError> for EngineError {
    fn from(value: InvoiceServiceError) -> Self {
        EngineError::Invoice(value.to_string())
    }
}

impl EngineError {
    /// True for failures where retrying the same request may succeed
    /// (concurrent modification, collaborator outage).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Conflict(_)
                | EngineError::Store(_)
                | EngineError::Rate(_)
                | EngineError::Invoice(_)
        )
    }
}
