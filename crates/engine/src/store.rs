//! Document persistence collaborator.

use std::sync::Arc;

use thiserror::Error;

use salesdoc_core::{DocumentId, ExpectedVersion};
use salesdoc_documents::SalesDocument;

use crate::query::DocumentFilter;

/// Document store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic concurrency check failed (stale revision).
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    #[error("document not found")]
    NotFound,

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Revisioned, whole-document store.
///
/// Each persisted document carries a revision. `save` commits the given
/// document only if the stored revision still matches `expected`
/// (`Exact(0)` inserts), assigns the next revision, and returns the
/// committed copy. A stale expectation fails with `Conflict` and must not
/// partially apply.
///
/// `list` evaluates the filter against **stored** fields. The engine strips
/// the status criterion before calling it, because status is presented with
/// read-time expiry applied and `expired` is never stored by the lazy path.
pub trait DocumentStore: Send + Sync {
    fn load(&self, id: DocumentId) -> Result<SalesDocument, StoreError>;

    fn save(
        &self,
        doc: SalesDocument,
        expected: ExpectedVersion,
    ) -> Result<SalesDocument, StoreError>;

    fn delete(&self, id: DocumentId, expected: ExpectedVersion) -> Result<(), StoreError>;

    fn list(&self, filter: &DocumentFilter) -> Result<Vec<SalesDocument>, StoreError>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn load(&self, id: DocumentId) -> Result<SalesDocument, StoreError> {
        (**self).load(id)
    }

    fn save(
        &self,
        doc: SalesDocument,
        expected: ExpectedVersion,
    ) -> Result<SalesDocument, StoreError> {
        (**self).save(doc, expected)
    }

    fn delete(&self, id: DocumentId, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).delete(id, expected)
    }

    fn list(&self, filter: &DocumentFilter) -> Result<Vec<SalesDocument>, StoreError> {
        (**self).list(filter)
    }
}
