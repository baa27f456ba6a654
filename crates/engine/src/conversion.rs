//! One-way conversion of an eligible document into a final invoice.

use chrono::{DateTime, NaiveDate, Utc};

use salesdoc_core::{DomainError, DomainResult};
use salesdoc_documents::{ConvertedInvoice, DocumentAction, DocumentStatus, SalesDocument};

use crate::error::EngineResult;
use crate::invoicing::{InvoiceDraft, InvoiceService};

/// Materializes a document into a standalone invoice via the external
/// invoice-creation service.
///
/// Idempotence contract: an already-converted document fails fast with
/// `AlreadyConverted` before any collaborator call, so a retry after a
/// confirmed success cannot create a duplicate invoice. A retry after a
/// failed attempt (no reference stored) is safely repeatable.
#[derive(Debug)]
pub struct ConversionEngine<I> {
    invoices: I,
}

impl<I> ConversionEngine<I> {
    pub fn new(invoices: I) -> Self {
        Self { invoices }
    }
}

impl<I> ConversionEngine<I>
where
    I: InvoiceService,
{
    /// Check eligibility and create the invoice.
    ///
    /// Does not persist anything: the caller stores the returned reference
    /// on the source document under its optimistic revision check.
    pub fn convert(
        &self,
        doc: &SalesDocument,
        now: DateTime<Utc>,
        issued_on: NaiveDate,
    ) -> EngineResult<ConvertedInvoice> {
        check_eligibility(doc, now)?;

        let draft = InvoiceDraft::from_document(doc, issued_on);
        let created = self.invoices.create_invoice(&draft)?;
        tracing::info!(
            document_id = %doc.id(),
            invoice_ref = %created.invoice_ref,
            "invoice created from document"
        );

        Ok(ConvertedInvoice {
            invoice_id: created.invoice_id,
            invoice_ref: created.invoice_ref,
        })
    }
}

fn check_eligibility(doc: &SalesDocument, now: DateTime<Utc>) -> DomainResult<()> {
    if doc.is_converted() {
        return Err(DomainError::AlreadyConverted);
    }
    let from = doc.effective_status(now);
    if !matches!(
        from,
        DocumentStatus::Sent | DocumentStatus::Accepted | DocumentStatus::Delivered
    ) {
        return Err(DomainError::invalid_transition(from, DocumentAction::Convert));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use salesdoc_core::{CurrencyId, CustomerId, DocumentId, InvoiceId, ProductId, StoreId, UserId};
    use salesdoc_documents::{DocumentKind, NewDocument, NewLineItem};

    use crate::error::EngineError;
    use crate::invoicing::{CreatedInvoice, InvoiceServiceError};

    struct CountingInvoiceService {
        calls: AtomicUsize,
    }

    impl CountingInvoiceService {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl InvoiceService for CountingInvoiceService {
        fn create_invoice(
            &self,
            _draft: &InvoiceDraft,
        ) -> Result<CreatedInvoice, InvoiceServiceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(CreatedInvoice {
                invoice_id: InvoiceId::new(),
                invoice_ref: format!("INV-{n:05}"),
            })
        }
    }

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn sent_document() -> SalesDocument {
        let mut doc = SalesDocument::create(
            NewDocument {
                id: DocumentId::new(),
                kind: DocumentKind::Order,
                ref_number: "SO-0001".to_string(),
                document_date: test_time().date_naive(),
                customer_id: CustomerId::new(),
                store_id: StoreId::new(),
                currency_id: CurrencyId::new(),
                line_items: vec![NewLineItem {
                    product_id: ProductId::new(),
                    quantity: 3,
                    unit_price: dec!(40.00),
                }],
                valid_until: Some(test_time().date_naive() + Duration::days(30)),
            },
            CurrencyId::new(),
            dec!(1.500000),
            UserId::new(),
            test_time(),
        )
        .unwrap();
        doc.send(UserId::new(), test_time()).unwrap();
        doc
    }

    #[test]
    fn convert_builds_draft_from_frozen_amounts() {
        let engine = ConversionEngine::new(CountingInvoiceService::new());
        let doc = sent_document();

        let invoice = engine
            .convert(&doc, test_time(), test_time().date_naive())
            .unwrap();
        assert_eq!(invoice.invoice_ref, "INV-00001");
    }

    #[test]
    fn converted_document_fails_before_the_collaborator_is_called() {
        let service = Arc::new(CountingInvoiceService::new());
        let mut doc = sent_document();

        // First conversion succeeds and is stored on the document.
        let engine = ConversionEngine::new(service.clone());
        let invoice = engine
            .convert(&doc, test_time(), test_time().date_naive())
            .unwrap();
        doc.mark_converted(UserId::new(), test_time(), invoice)
            .unwrap();

        let err = engine
            .convert(&doc, test_time(), test_time().date_naive())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(DomainError::AlreadyConverted)
        ));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drafts_and_expired_documents_are_not_eligible() {
        let engine = ConversionEngine::new(CountingInvoiceService::new());

        let mut doc = sent_document();
        let after_deadline = test_time() + Duration::days(31);
        let err = engine
            .convert(&doc, after_deadline, after_deadline.date_naive())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(DomainError::InvalidTransition { .. })
        ));

        // Reopened (draft) documents are not eligible either.
        doc.reopen(
            UserId::new(),
            after_deadline,
            after_deadline.date_naive() + Duration::days(10),
        )
        .unwrap();
        let err = engine
            .convert(&doc, after_deadline, after_deadline.date_naive())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(DomainError::InvalidTransition { .. })
        ));
    }
}
