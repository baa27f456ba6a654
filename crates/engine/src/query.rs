//! Read-side filtering, sorting, and pagination.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use salesdoc_core::{CustomerId, StoreId};
use salesdoc_documents::{DocumentKind, DocumentStatus, SalesDocument};

/// Listing criteria. All fields are conjunctive; `None` means "any".
///
/// `status` is matched against the **effective** status (expiry applied),
/// which is why the engine strips it before handing the filter to the store
/// and re-applies it after presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFilter {
    pub kind: Option<DocumentKind>,
    pub status: Option<DocumentStatus>,
    pub customer_id: Option<CustomerId>,
    pub store_id: Option<StoreId>,
    pub converted: Option<bool>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl DocumentFilter {
    /// Copy of the filter with the status criterion removed, for store-side
    /// evaluation against stored fields.
    pub fn without_status(&self) -> Self {
        Self {
            status: None,
            ..self.clone()
        }
    }

    /// Evaluate every set criterion against the document as given.
    pub fn matches(&self, doc: &SalesDocument) -> bool {
        if self.kind.is_some_and(|kind| doc.kind() != kind) {
            return false;
        }
        if self.status.is_some_and(|status| doc.status() != status) {
            return false;
        }
        if self.customer_id.is_some_and(|id| doc.customer_id() != id) {
            return false;
        }
        if self.store_id.is_some_and(|id| doc.store_id() != id) {
            return false;
        }
        if self
            .converted
            .is_some_and(|converted| doc.is_converted() != converted)
        {
            return false;
        }
        if self.date_from.is_some_and(|from| doc.document_date() < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| doc.document_date() > to) {
            return false;
        }
        true
    }
}

/// Sortable document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    DocumentDate,
    RefNumber,
    TotalAmount,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSort {
    pub field: SortField,
    pub ascending: bool,
}

impl Default for DocumentSort {
    /// Most recently touched first.
    fn default() -> Self {
        Self {
            field: SortField::UpdatedAt,
            ascending: false,
        }
    }
}

impl DocumentSort {
    pub fn apply(&self, docs: &mut [SalesDocument]) {
        docs.sort_by(|a, b| {
            let ordering = match self.field {
                SortField::DocumentDate => a.document_date().cmp(&b.document_date()),
                SortField::RefNumber => a.ref_number().cmp(b.ref_number()),
                SortField::TotalAmount => a.total_amount().cmp(&b.total_amount()),
                SortField::UpdatedAt => a.updated().at.cmp(&b.updated().at),
            };
            if self.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}

/// Offset/limit pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// One page of results plus the total match count before paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub items: Vec<SalesDocument>,
    pub total: usize,
}
