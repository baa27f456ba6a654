//! Lifecycle request pipeline.
//!
//! Every operation follows the same shape: load the document, check the
//! caller's capability, apply the guarded transition in memory, and commit
//! against the revision that was loaded. A document that moved underneath
//! the request fails the commit with `Conflict`; nothing partially applies.

use chrono::{DateTime, NaiveDate, Utc};

use salesdoc_core::{DocumentId, CurrencyId, DomainError, DomainResult, ExpectedVersion, UserId};
use salesdoc_documents::{
    DocumentAction, DocumentKind, DocumentPatch, NewDocument, SalesDocument,
};

use crate::authz::{CapabilityChecker, capability_for};
use crate::conversion::ConversionEngine;
use crate::error::{EngineError, EngineResult};
use crate::invoicing::InvoiceService;
use crate::query::{DocumentFilter, DocumentPage, DocumentSort, Page};
use crate::rates::RateSource;
use crate::store::DocumentStore;

/// Per-request invocation context.
///
/// `now` is sampled once per request and used for every guard, stamp, and
/// expiry check within it, so a document cannot flicker between expired and
/// non-expired mid-operation.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub actor: UserId,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(actor: UserId, now: DateTime<Utc>) -> Self {
        Self { actor, now }
    }
}

/// The lifecycle engine's public surface.
///
/// Generic over the four collaborators so tests can run against in-memory
/// implementations and deployments can plug in real backends without
/// touching domain code.
#[derive(Debug)]
pub struct LifecycleEngine<S, R, I, C> {
    store: S,
    rates: R,
    conversion: ConversionEngine<I>,
    capabilities: C,
    system_currency_id: CurrencyId,
}

impl<S, R, I, C> LifecycleEngine<S, R, I, C> {
    pub fn new(
        store: S,
        rates: R,
        invoices: I,
        capabilities: C,
        system_currency_id: CurrencyId,
    ) -> Self {
        Self {
            store,
            rates,
            conversion: ConversionEngine::new(invoices),
            capabilities,
            system_currency_id,
        }
    }

    pub fn system_currency_id(&self) -> CurrencyId {
        self.system_currency_id
    }
}

impl<S, R, I, C> LifecycleEngine<S, R, I, C>
where
    S: DocumentStore,
    R: RateSource,
    I: InvoiceService,
    C: CapabilityChecker,
{
    /// Create a new draft document.
    ///
    /// The exchange rate is fetched from the rate source as of the document
    /// date; it stays live (re-fetched on edits) until `send` freezes it.
    pub fn create(&self, ctx: &RequestContext, new: NewDocument) -> EngineResult<SalesDocument> {
        self.authorize(ctx, new.kind, DocumentAction::Create)?;

        let rate = self.rates.rate(new.currency_id, new.document_date)?;
        let doc = SalesDocument::create(new, self.system_currency_id, rate, ctx.actor, ctx.now)?;
        let committed = self.store.save(doc, ExpectedVersion::Exact(0))?;
        tracing::info!(
            document_id = %committed.id(),
            kind = %committed.kind(),
            ref_number = %committed.ref_number(),
            "document created"
        );
        Ok(committed)
    }

    /// Edit a draft. Always re-fetches the exchange rate and recomputes
    /// totals, even for patches that leave the line items alone.
    pub fn edit(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        patch: DocumentPatch,
    ) -> EngineResult<SalesDocument> {
        let mut doc = self.store.load(id)?;
        self.authorize(ctx, doc.kind(), DocumentAction::Edit)?;
        let expected = ExpectedVersion::Exact(doc.version());

        let currency_id = patch.currency_id.unwrap_or_else(|| doc.currency_id());
        let rate = self.rates.rate(currency_id, ctx.now.date_naive())?;
        doc.apply_edit(ctx.actor, ctx.now, patch, rate)?;

        let committed = self.store.save(doc, expected)?;
        tracing::info!(document_id = %id, "document edited");
        Ok(committed)
    }

    /// Delete a never-converted draft.
    pub fn delete(&self, ctx: &RequestContext, id: DocumentId) -> EngineResult<()> {
        let doc = self.store.load(id)?;
        self.authorize(ctx, doc.kind(), DocumentAction::Delete)?;
        doc.ensure_deletable(ctx.now)?;

        self.store.delete(id, ExpectedVersion::Exact(doc.version()))?;
        tracing::info!(document_id = %id, "document deleted");
        Ok(())
    }

    /// Dispatch a draft to the customer, freezing its rate snapshot.
    pub fn send(&self, ctx: &RequestContext, id: DocumentId) -> EngineResult<SalesDocument> {
        self.transition(ctx, id, DocumentAction::Send, |doc| {
            doc.send(ctx.actor, ctx.now)
        })
    }

    /// Record customer acceptance.
    pub fn accept(&self, ctx: &RequestContext, id: DocumentId) -> EngineResult<SalesDocument> {
        self.transition(ctx, id, DocumentAction::Accept, |doc| {
            doc.accept(ctx.actor, ctx.now)
        })
    }

    /// Record customer rejection with a mandatory reason.
    pub fn reject(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        reason: &str,
    ) -> EngineResult<SalesDocument> {
        self.transition(ctx, id, DocumentAction::Reject, |doc| {
            doc.reject(ctx.actor, ctx.now, reason)
        })
    }

    /// Mark an accepted order as delivered (orders only).
    pub fn fulfill(&self, ctx: &RequestContext, id: DocumentId) -> EngineResult<SalesDocument> {
        self.transition(ctx, id, DocumentAction::Fulfill, |doc| {
            doc.fulfill(ctx.actor, ctx.now)
        })
    }

    /// Return an expired document to draft under a new validity deadline.
    pub fn reopen(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        new_valid_until: NaiveDate,
    ) -> EngineResult<SalesDocument> {
        self.transition(ctx, id, DocumentAction::Reopen, |doc| {
            doc.reopen(ctx.actor, ctx.now, new_valid_until)
        })
    }

    /// Convert an eligible document into a final invoice.
    ///
    /// Status is unchanged; the invoice reference is stored on the source
    /// document, which becomes immutable for editing and deletion. See
    /// [`ConversionEngine`] for the idempotence contract.
    pub fn convert(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        as_of: Option<NaiveDate>,
    ) -> EngineResult<SalesDocument> {
        let mut doc = self.store.load(id)?;
        self.authorize(ctx, doc.kind(), DocumentAction::Convert)?;
        let expected = ExpectedVersion::Exact(doc.version());

        let issued_on = as_of.unwrap_or_else(|| ctx.now.date_naive());
        let invoice = self.conversion.convert(&doc, ctx.now, issued_on)?;
        doc.mark_converted(ctx.actor, ctx.now, invoice)?;

        let committed = self.store.save(doc, expected)?;
        tracing::info!(
            document_id = %id,
            invoice_ref = %committed
                .converted_invoice()
                .map(|inv| inv.invoice_ref.as_str())
                .unwrap_or_default(),
            "document converted"
        );
        Ok(committed)
    }

    /// Fetch one document, presented with read-time expiry applied.
    pub fn get(&self, ctx: &RequestContext, id: DocumentId) -> EngineResult<SalesDocument> {
        let doc = self.store.load(id)?;
        self.authorize(ctx, doc.kind(), DocumentAction::Read)?;
        Ok(doc.presented(ctx.now))
    }

    /// List documents with filtering, sorting, and pagination.
    ///
    /// Status filtering happens after expiry derivation, so `expired` is a
    /// queryable status even though the lazy path never stores it. When the
    /// filter names no kind, documents of kinds the caller may not read are
    /// silently omitted rather than failing the whole listing.
    pub fn list(
        &self,
        ctx: &RequestContext,
        filter: &DocumentFilter,
        sort: DocumentSort,
        page: Page,
    ) -> EngineResult<DocumentPage> {
        if let Some(kind) = filter.kind {
            self.authorize(ctx, kind, DocumentAction::Read)?;
        }

        let stored = self.store.list(&filter.without_status())?;
        let mut docs: Vec<SalesDocument> = stored
            .into_iter()
            .filter(|doc| {
                self.capabilities.can_perform(
                    ctx.actor,
                    &capability_for(doc.kind(), DocumentAction::Read),
                )
            })
            .map(|doc| doc.presented(ctx.now))
            .filter(|doc| {
                filter
                    .status
                    .is_none_or(|status| doc.status() == status)
            })
            .collect();

        sort.apply(&mut docs);
        let total = docs.len();
        let items = docs
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();
        Ok(DocumentPage { items, total })
    }

    /// Bulk creation. Rows are independent: one row's failure does not
    /// abort or roll back another row's success.
    pub fn import(
        &self,
        ctx: &RequestContext,
        rows: Vec<NewDocument>,
    ) -> Vec<EngineResult<SalesDocument>> {
        rows.into_iter()
            .enumerate()
            .map(|(row, new)| {
                let result = self.create(ctx, new);
                if let Err(error) = &result {
                    tracing::warn!(row, %error, "import row failed");
                }
                result
            })
            .collect()
    }

    fn transition(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        action: DocumentAction,
        apply: impl FnOnce(&mut SalesDocument) -> DomainResult<()>,
    ) -> EngineResult<SalesDocument> {
        let mut doc = self.store.load(id)?;
        self.authorize(ctx, doc.kind(), action)?;
        let expected = ExpectedVersion::Exact(doc.version());

        apply(&mut doc)?;

        let committed = self.store.save(doc, expected)?;
        tracing::info!(
            document_id = %id,
            action = %action,
            status = %committed.status(),
            "transition committed"
        );
        Ok(committed)
    }

    fn authorize(
        &self,
        ctx: &RequestContext,
        kind: DocumentKind,
        action: DocumentAction,
    ) -> EngineResult<()> {
        let capability = capability_for(kind, action);
        if self.capabilities.can_perform(ctx.actor, &capability) {
            Ok(())
        } else {
            tracing::warn!(actor = %ctx.actor, %capability, "capability denied");
            Err(EngineError::Domain(DomainError::unauthorized(
                capability.as_str(),
            )))
        }
    }
}
