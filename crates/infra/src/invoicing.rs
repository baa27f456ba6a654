use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use salesdoc_core::InvoiceId;
use salesdoc_engine::{CreatedInvoice, InvoiceDraft, InvoiceService, InvoiceServiceError};

/// In-memory invoice-creation service.
///
/// Records every draft it accepts and hands out sequential `INV-%05d`
/// references. `fail_next` makes the next call fail without recording
/// anything, which is how tests exercise the retry-after-failure path of
/// the conversion contract.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceService {
    created: Mutex<Vec<InvoiceDraft>>,
    fail_next: AtomicBool,
}

impl InMemoryInvoiceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Number of invoices actually created.
    pub fn created_count(&self) -> usize {
        self.created.lock().map(|drafts| drafts.len()).unwrap_or(0)
    }

    pub fn last_draft(&self) -> Option<InvoiceDraft> {
        self.created
            .lock()
            .ok()
            .and_then(|drafts| drafts.last().cloned())
    }
}

impl InvoiceService for InMemoryInvoiceService {
    fn create_invoice(&self, draft: &InvoiceDraft) -> Result<CreatedInvoice, InvoiceServiceError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(InvoiceServiceError::Failed("simulated outage".to_string()));
        }

        let mut created = self
            .created
            .lock()
            .map_err(|_| InvoiceServiceError::Failed("lock poisoned".to_string()))?;
        created.push(draft.clone());
        let n = created.len();
        Ok(CreatedInvoice {
            invoice_id: InvoiceId::new(),
            invoice_ref: format!("INV-{n:05}"),
        })
    }
}
