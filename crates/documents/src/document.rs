use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use salesdoc_core::{
    CurrencyId, CustomerId, DocumentId, DomainError, DomainResult, InvoiceId, ProductId, StoreId,
    UserId,
};

use crate::{currency, expiry};

/// Document kind descriptor.
///
/// A quote (proforma invoice) and an order (sales order) share one state
/// machine; the descriptor tells the shared logic where they differ: whether
/// the `delivered` status exists, and which capability namespace gates each
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Quote,
    Order,
}

impl DocumentKind {
    /// Whether the `delivered` status (and the `fulfill` transition) exists.
    pub fn supports_delivery(self) -> bool {
        matches!(self, DocumentKind::Order)
    }

    /// Capability namespace for this kind (e.g. `quotes.send`).
    pub fn module_name(self) -> &'static str {
        match self {
            DocumentKind::Quote => "quotes",
            DocumentKind::Order => "orders",
        }
    }
}

impl core::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DocumentKind::Quote => f.write_str("quote"),
            DocumentKind::Order => f.write_str("order"),
        }
    }
}

/// Sales document status lifecycle.
///
/// `Expired` is derived at read time and consumed only by `reopen`; the lazy
/// read path never writes it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
    Delivered,
}

impl core::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Accepted => "accepted",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Expired => "expired",
            DocumentStatus::Delivered => "delivered",
        };
        f.write_str(s)
    }
}

/// Operations on a document that can be requested by a caller.
///
/// Used for capability lookups and for naming the requested event in
/// transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentAction {
    Create,
    Edit,
    Delete,
    Send,
    Accept,
    Reject,
    Fulfill,
    Reopen,
    Convert,
    Read,
}

impl DocumentAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentAction::Create => "create",
            DocumentAction::Edit => "edit",
            DocumentAction::Delete => "delete",
            DocumentAction::Send => "send",
            DocumentAction::Accept => "accept",
            DocumentAction::Reject => "reject",
            DocumentAction::Fulfill => "fulfill",
            DocumentAction::Reopen => "reopen",
            DocumentAction::Convert => "convert",
            DocumentAction::Read => "read",
        }
    }
}

impl core::fmt::Display for DocumentAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document line: product, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_no: u32,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn line_total(&self) -> DomainResult<Decimal> {
        Decimal::from(self.quantity)
            .checked_mul(self.unit_price)
            .ok_or_else(|| DomainError::validation("line amount overflow"))
    }
}

/// Line input before line numbers are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Actor + instant pair recorded when a transition occurs.
///
/// Stamps are never cleared; a transition re-run after a reopen restamps
/// with its latest occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub by: UserId,
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    pub fn new(by: UserId, at: DateTime<Utc>) -> Self {
        Self { by, at }
    }
}

/// Reference to the invoice a document was converted into.
///
/// Presence marks the document as converted, an axis orthogonal to status:
/// a sent, accepted, or delivered document may simultaneously be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedInvoice {
    pub invoice_id: InvoiceId,
    pub invoice_ref: String,
}

/// Input for creating a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub ref_number: String,
    pub document_date: NaiveDate,
    pub customer_id: CustomerId,
    pub store_id: StoreId,
    pub currency_id: CurrencyId,
    pub line_items: Vec<NewLineItem>,
    pub valid_until: Option<NaiveDate>,
}

/// Draft-only edit. Absent fields are left unchanged. The exchange rate is
/// always re-fetched by the caller and totals are recomputed, even when the
/// patch itself is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub line_items: Option<Vec<NewLineItem>>,
    pub currency_id: Option<CurrencyId>,
    pub valid_until: Option<NaiveDate>,
}

/// A quote-like commercial document progressing through the sales lifecycle.
///
/// All transition methods are pure (no IO) and check their guards against the
/// **effective** status (the stored status with read-time expiry applied)
/// before touching any field. Persistence and capability checks are the
/// engine's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesDocument {
    id: DocumentId,
    kind: DocumentKind,
    ref_number: String,
    document_date: NaiveDate,
    customer_id: CustomerId,
    store_id: StoreId,
    status: DocumentStatus,
    line_items: Vec<LineItem>,
    currency_id: CurrencyId,
    exchange_rate: Decimal,
    total_amount: Decimal,
    system_currency_id: CurrencyId,
    equivalent_amount: Decimal,
    valid_until: Option<NaiveDate>,
    rejection_reason: Option<String>,
    sent: Option<AuditStamp>,
    accepted: Option<AuditStamp>,
    rejected: Option<AuditStamp>,
    delivered: Option<AuditStamp>,
    converted_invoice: Option<ConvertedInvoice>,
    created: AuditStamp,
    updated: AuditStamp,
    version: u64,
}

impl SalesDocument {
    /// Create a new draft document.
    ///
    /// Line items may be empty in draft; `send` is the transition that
    /// requires them. `valid_until`, when supplied, must not already be in
    /// the past.
    pub fn create(
        new: NewDocument,
        system_currency_id: CurrencyId,
        exchange_rate: Decimal,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let ref_number = new.ref_number.trim();
        if ref_number.is_empty() {
            return Err(DomainError::validation("ref_number must not be empty"));
        }

        if let Some(valid_until) = new.valid_until {
            if valid_until < now.date_naive() {
                return Err(DomainError::validation(
                    "valid_until must not be in the past",
                ));
            }
        }

        let exchange_rate = currency::validate_rate(exchange_rate)?;
        let line_items = number_lines(&new.line_items)?;
        let total_amount = total_of(&line_items)?;
        let equivalent_amount = currency::equivalent_amount(total_amount, exchange_rate);

        let stamp = AuditStamp::new(actor, now);
        Ok(Self {
            id: new.id,
            kind: new.kind,
            ref_number: ref_number.to_string(),
            document_date: new.document_date,
            customer_id: new.customer_id,
            store_id: new.store_id,
            status: DocumentStatus::Draft,
            line_items,
            currency_id: new.currency_id,
            exchange_rate,
            total_amount,
            system_currency_id,
            equivalent_amount,
            valid_until: new.valid_until,
            rejection_reason: None,
            sent: None,
            accepted: None,
            rejected: None,
            delivered: None,
            converted_invoice: None,
            created: stamp,
            updated: stamp,
            version: 0,
        })
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn ref_number(&self) -> &str {
        &self.ref_number
    }

    pub fn document_date(&self) -> NaiveDate {
        self.document_date
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    /// Stored status, without read-time expiry applied. Most callers want
    /// [`SalesDocument::effective_status`].
    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn currency_id(&self) -> CurrencyId {
        self.currency_id
    }

    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn system_currency_id(&self) -> CurrencyId {
        self.system_currency_id
    }

    pub fn equivalent_amount(&self) -> Decimal {
        self.equivalent_amount
    }

    pub fn valid_until(&self) -> Option<NaiveDate> {
        self.valid_until
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn sent_stamp(&self) -> Option<AuditStamp> {
        self.sent
    }

    pub fn accepted_stamp(&self) -> Option<AuditStamp> {
        self.accepted
    }

    pub fn rejected_stamp(&self) -> Option<AuditStamp> {
        self.rejected
    }

    pub fn delivered_stamp(&self) -> Option<AuditStamp> {
        self.delivered
    }

    pub fn converted_invoice(&self) -> Option<&ConvertedInvoice> {
        self.converted_invoice.as_ref()
    }

    pub fn is_converted(&self) -> bool {
        self.converted_invoice.is_some()
    }

    pub fn created(&self) -> AuditStamp {
        self.created
    }

    pub fn updated(&self) -> AuditStamp {
        self.updated
    }

    /// Persistence revision. Assigned by the store on commit.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Set the persistence revision. Only store implementations should call
    /// this.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Status with lazy expiry applied: a sent/accepted/delivered document
    /// past its validity deadline reads as `expired` without any stored
    /// transition.
    pub fn effective_status(&self, now: DateTime<Utc>) -> DocumentStatus {
        if expiry::is_expired(self, now) {
            DocumentStatus::Expired
        } else {
            self.status
        }
    }

    /// Present the document the way reads must see it: with the derived
    /// status materialized on the returned copy. The stored record is not
    /// changed.
    pub fn presented(&self, now: DateTime<Utc>) -> Self {
        let mut doc = self.clone();
        doc.status = self.effective_status(now);
        doc
    }

    /// Dispatch a draft to the customer.
    pub fn send(&mut self, actor: UserId, now: DateTime<Utc>) -> DomainResult<()> {
        let from = self.effective_status(now);
        if from != DocumentStatus::Draft {
            return Err(DomainError::invalid_transition(from, DocumentAction::Send));
        }
        if self.line_items.is_empty() {
            return Err(DomainError::validation(
                "cannot send a document without line items",
            ));
        }
        if self.total_amount <= Decimal::ZERO {
            return Err(DomainError::validation(
                "cannot send a document with a non-positive total",
            ));
        }

        self.status = DocumentStatus::Sent;
        self.sent = Some(AuditStamp::new(actor, now));
        self.touch(actor, now);
        Ok(())
    }

    /// Record customer acceptance.
    pub fn accept(&mut self, actor: UserId, now: DateTime<Utc>) -> DomainResult<()> {
        let from = self.effective_status(now);
        if from != DocumentStatus::Sent {
            return Err(DomainError::invalid_transition(from, DocumentAction::Accept));
        }

        self.status = DocumentStatus::Accepted;
        self.accepted = Some(AuditStamp::new(actor, now));
        self.touch(actor, now);
        Ok(())
    }

    /// Record customer rejection. Rejected documents are terminal.
    pub fn reject(&mut self, actor: UserId, now: DateTime<Utc>, reason: &str) -> DomainResult<()> {
        let from = self.effective_status(now);
        if from != DocumentStatus::Sent {
            return Err(DomainError::invalid_transition(from, DocumentAction::Reject));
        }

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::MissingRejectionReason);
        }

        self.status = DocumentStatus::Rejected;
        self.rejection_reason = Some(reason.to_string());
        self.rejected = Some(AuditStamp::new(actor, now));
        self.touch(actor, now);
        Ok(())
    }

    /// Mark an accepted order as delivered. Quotes have no delivery leg.
    pub fn fulfill(&mut self, actor: UserId, now: DateTime<Utc>) -> DomainResult<()> {
        let from = self.effective_status(now);
        if !self.kind.supports_delivery() || from != DocumentStatus::Accepted {
            return Err(DomainError::invalid_transition(
                from,
                DocumentAction::Fulfill,
            ));
        }

        self.status = DocumentStatus::Delivered;
        self.delivered = Some(AuditStamp::new(actor, now));
        self.touch(actor, now);
        Ok(())
    }

    /// Return an expired document to draft with a new validity deadline.
    ///
    /// Audit stamps from before the expiry are retained; the frozen exchange
    /// rate is not refreshed (only a subsequent draft edit does that).
    pub fn reopen(
        &mut self,
        actor: UserId,
        now: DateTime<Utc>,
        new_valid_until: NaiveDate,
    ) -> DomainResult<()> {
        if self.is_converted() {
            return Err(DomainError::AlreadyConverted);
        }
        let from = self.effective_status(now);
        if from != DocumentStatus::Expired {
            return Err(DomainError::invalid_transition(from, DocumentAction::Reopen));
        }

        let today = now.date_naive();
        if new_valid_until <= today {
            return Err(DomainError::invalid_reopen_date(format!(
                "new valid_until {new_valid_until} must be strictly after {today}"
            )));
        }

        self.status = DocumentStatus::Draft;
        self.valid_until = Some(new_valid_until);
        self.touch(actor, now);
        Ok(())
    }

    /// Record the invoice a successful conversion produced.
    ///
    /// Conversion leaves the status unchanged; the invoice reference is an
    /// orthogonal one-shot flag.
    pub fn mark_converted(
        &mut self,
        actor: UserId,
        now: DateTime<Utc>,
        invoice: ConvertedInvoice,
    ) -> DomainResult<()> {
        if self.is_converted() {
            return Err(DomainError::AlreadyConverted);
        }
        let from = self.effective_status(now);
        if !matches!(
            from,
            DocumentStatus::Sent | DocumentStatus::Accepted | DocumentStatus::Delivered
        ) {
            return Err(DomainError::invalid_transition(
                from,
                DocumentAction::Convert,
            ));
        }

        self.converted_invoice = Some(invoice);
        self.touch(actor, now);
        Ok(())
    }

    /// Apply a draft-only edit and recompute totals under a freshly fetched
    /// exchange rate.
    pub fn apply_edit(
        &mut self,
        actor: UserId,
        now: DateTime<Utc>,
        patch: DocumentPatch,
        fresh_rate: Decimal,
    ) -> DomainResult<()> {
        self.ensure_mutable(now, DocumentAction::Edit)?;

        if let Some(valid_until) = patch.valid_until {
            if valid_until < now.date_naive() {
                return Err(DomainError::validation(
                    "valid_until must not be in the past",
                ));
            }
        }

        let line_items = match &patch.line_items {
            Some(lines) => number_lines(lines)?,
            None => self.line_items.clone(),
        };
        let exchange_rate = currency::validate_rate(fresh_rate)?;
        let total_amount = total_of(&line_items)?;

        self.line_items = line_items;
        if let Some(currency_id) = patch.currency_id {
            self.currency_id = currency_id;
        }
        if let Some(valid_until) = patch.valid_until {
            self.valid_until = Some(valid_until);
        }
        self.exchange_rate = exchange_rate;
        self.total_amount = total_amount;
        self.equivalent_amount = currency::equivalent_amount(total_amount, exchange_rate);
        self.touch(actor, now);
        Ok(())
    }

    /// Check that the document may be deleted: draft, never converted.
    pub fn ensure_deletable(&self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_mutable(now, DocumentAction::Delete)
    }

    fn ensure_mutable(&self, now: DateTime<Utc>, action: DocumentAction) -> DomainResult<()> {
        if self.is_converted() {
            return Err(DomainError::not_editable(format!(
                "cannot {action} a converted document"
            )));
        }
        let from = self.effective_status(now);
        if from != DocumentStatus::Draft {
            return Err(DomainError::not_editable(format!(
                "cannot {action} a {from} document"
            )));
        }
        Ok(())
    }

    fn touch(&mut self, actor: UserId, now: DateTime<Utc>) {
        self.updated = AuditStamp::new(actor, now);
    }
}

fn number_lines(lines: &[NewLineItem]) -> DomainResult<Vec<LineItem>> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if line.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "line {}: quantity must be positive",
                    idx + 1
                )));
            }
            if line.unit_price < Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "line {}: unit_price must not be negative",
                    idx + 1
                )));
            }
            Ok(LineItem {
                line_no: (idx as u32) + 1,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
        })
        .collect()
}

fn total_of(lines: &[LineItem]) -> DomainResult<Decimal> {
    let mut total = Decimal::ZERO;
    for line in lines {
        total = total
            .checked_add(line.line_total()?)
            .ok_or_else(|| DomainError::validation("document total overflow"))?;
    }
    Ok(currency::round_minor(total))
}
