//! Invoice-creation collaborator.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use salesdoc_core::{CurrencyId, CustomerId, DocumentId, InvoiceId, StoreId};
use salesdoc_documents::{DocumentKind, LineItem, SalesDocument};

/// Payload submitted to the invoice-creation service.
///
/// Built exclusively from the source document's frozen line items and
/// amounts; the conversion never re-prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub source_document_id: DocumentId,
    pub source_ref: String,
    pub kind: DocumentKind,
    pub customer_id: CustomerId,
    pub store_id: StoreId,
    pub issued_on: NaiveDate,
    pub line_items: Vec<LineItem>,
    pub currency_id: CurrencyId,
    pub exchange_rate: Decimal,
    pub total_amount: Decimal,
    pub system_currency_id: CurrencyId,
    pub equivalent_amount: Decimal,
}

impl InvoiceDraft {
    pub fn from_document(doc: &SalesDocument, issued_on: NaiveDate) -> Self {
        Self {
            source_document_id: doc.id(),
            source_ref: doc.ref_number().to_string(),
            kind: doc.kind(),
            customer_id: doc.customer_id(),
            store_id: doc.store_id(),
            issued_on,
            line_items: doc.line_items().to_vec(),
            currency_id: doc.currency_id(),
            exchange_rate: doc.exchange_rate(),
            total_amount: doc.total_amount(),
            system_currency_id: doc.system_currency_id(),
            equivalent_amount: doc.equivalent_amount(),
        }
    }
}

/// Identifier and reference of the invoice the service created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedInvoice {
    pub invoice_id: InvoiceId,
    pub invoice_ref: String,
}

#[derive(Debug, Error)]
pub enum InvoiceServiceError {
    #[error("invoice service failure: {0}")]
    Failed(String),
}

/// External invoice-creation service.
pub trait InvoiceService: Send + Sync {
    fn create_invoice(&self, draft: &InvoiceDraft) -> Result<CreatedInvoice, InvoiceServiceError>;
}

impl<I> InvoiceService for Arc<I>
where
    I: InvoiceService + ?Sized,
{
    fn create_invoice(&self, draft: &InvoiceDraft) -> Result<CreatedInvoice, InvoiceServiceError> {
        (**self).create_invoice(draft)
    }
}
