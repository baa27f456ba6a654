//! Infrastructure layer: in-memory collaborator implementations and telemetry.
//!
//! The in-memory adapters are intended for tests, development, and
//! single-process embedding. Real deployments substitute their own
//! `DocumentStore` / `RateSource` / `InvoiceService` / `CapabilityChecker`
//! implementations; the engine does not care.

pub mod capabilities;
pub mod in_memory;
pub mod invoicing;
pub mod rates;
pub mod telemetry;


pub use capabilities::StaticCapabilityChecker;
pub use in_memory::InMemoryDocumentStore;
pub use invoicing::InMemoryInvoiceService;
pub use rates::StaticRateSource;
