//! Application layer for the sales-document lifecycle.
//!
//! The engine orchestrates each request against the collaborator traits
//! declared here: load the document, check the caller's capability, apply the
//! guarded transition, and commit atomically against the revision that was
//! loaded. It contains no IO itself.

pub mod authz;
pub mod conversion;
pub mod error;
pub mod invoicing;
pub mod lifecycle;
pub mod query;
pub mod rates;
pub mod store;

pub use authz::{Capability, CapabilityChecker, capability_for};
pub use conversion::ConversionEngine;
pub use error::{EngineError, EngineResult};
pub use invoicing::{CreatedInvoice, InvoiceDraft, InvoiceService, InvoiceServiceError};
pub use lifecycle::{LifecycleEngine, RequestContext};
pub use query::{DocumentFilter, DocumentPage, DocumentSort, Page, SortField};
pub use rates::{RateError, RateSource};
pub use store::{DocumentStore, StoreError};
