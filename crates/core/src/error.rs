//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (guards,
/// validation, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A lifecycle event was requested from a state that does not allow it.
    #[error("invalid transition: cannot {event} a {from} document")]
    InvalidTransition { from: String, event: String },

    /// A rejection was attempted without a (trimmed) non-empty reason.
    #[error("rejection requires a non-empty reason")]
    MissingRejectionReason,

    /// A reopen date was supplied that is not strictly in the future.
    #[error("invalid reopen date: {0}")]
    InvalidReopenDate(String),

    /// The document has already been converted into an invoice.
    #[error("document is already converted to an invoice")]
    AlreadyConverted,

    /// An edit or delete was attempted outside draft, or on a converted document.
    #[error("document is not editable: {0}")]
    NotEditable(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// Authorization failure at the domain boundary.
    #[error("unauthorized: missing capability '{0}'")]
    Unauthorized(String),
}

impl DomainError {
    pub fn invalid_transition(
        from: impl core::fmt::Display,
        event: impl core::fmt::Display,
    ) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            event: event.to_string(),
        }
    }

    pub fn invalid_reopen_date(msg: impl Into<String>) -> Self {
        Self::InvalidReopenDate(msg.into())
    }

    pub fn not_editable(msg: impl Into<String>) -> Self {
        Self::NotEditable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn unauthorized(capability: impl Into<String>) -> Self {
        Self::Unauthorized(capability.into())
    }
}
