use std::collections::HashMap;
use std::sync::RwLock;

use salesdoc_core::{DocumentId, ExpectedVersion};
use salesdoc_documents::SalesDocument;
use salesdoc_engine::{DocumentFilter, DocumentStore, StoreError};

/// In-memory revisioned document store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    docs: RwLock<HashMap<DocumentId, SalesDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn load(&self, id: DocumentId) -> Result<SalesDocument, StoreError> {
        let docs = self
            .docs
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        docs.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn save(
        &self,
        mut doc: SalesDocument,
        expected: ExpectedVersion,
    ) -> Result<SalesDocument, StoreError> {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let current = docs.get(&doc.id()).map(|stored| stored.version()).unwrap_or(0);
        if !expected.matches(current) {
            return Err(StoreError::Conflict(format!(
                "expected {expected:?}, found {current}"
            )));
        }

        doc.set_version(current + 1);
        docs.insert(doc.id(), doc.clone());
        Ok(doc)
    }

    fn delete(&self, id: DocumentId, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let current = docs.get(&id).map(|stored| stored.version()).ok_or(StoreError::NotFound)?;
        if !expected.matches(current) {
            return Err(StoreError::Conflict(format!(
                "expected {expected:?}, found {current}"
            )));
        }

        docs.remove(&id);
        Ok(())
    }

    fn list(&self, filter: &DocumentFilter) -> Result<Vec<SalesDocument>, StoreError> {
        let docs = self
            .docs
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(docs.values().filter(|doc| filter.matches(doc)).cloned().collect())
    }
}
