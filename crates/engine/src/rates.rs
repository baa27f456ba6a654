//! Currency-rate source collaborator.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use salesdoc_core::CurrencyId;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("no rate available for currency {currency_id} as of {as_of}")]
    Unavailable {
        currency_id: CurrencyId,
        as_of: NaiveDate,
    },

    #[error("rate source failure: {0}")]
    Source(String),
}

/// External source of exchange rates into the organization's base currency.
///
/// Consulted only while a document is in draft (creation and every edit);
/// `send` freezes the last fetched rate onto the document.
pub trait RateSource: Send + Sync {
    fn rate(&self, currency_id: CurrencyId, as_of: NaiveDate) -> Result<Decimal, RateError>;
}

impl<R> RateSource for Arc<R>
where
    R: RateSource + ?Sized,
{
    fn rate(&self, currency_id: CurrencyId, as_of: NaiveDate) -> Result<Decimal, RateError> {
        (**self).rate(currency_id, as_of)
    }
}
