use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use salesdoc_core::CurrencyId;
use salesdoc_engine::{RateError, RateSource};

/// Rate source backed by a static table of quotes.
///
/// Quotes can be replaced at runtime with [`StaticRateSource::set_rate`],
/// which is how tests simulate the market moving after a document's rate
/// was frozen.
#[derive(Debug, Default)]
pub struct StaticRateSource {
    quotes: RwLock<HashMap<CurrencyId, Decimal>>,
}

impl StaticRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(self, currency_id: CurrencyId, rate: Decimal) -> Self {
        self.set_rate(currency_id, rate);
        self
    }

    pub fn set_rate(&self, currency_id: CurrencyId, rate: Decimal) {
        if let Ok(mut quotes) = self.quotes.write() {
            quotes.insert(currency_id, rate);
        }
    }
}

impl RateSource for StaticRateSource {
    fn rate(&self, currency_id: CurrencyId, as_of: NaiveDate) -> Result<Decimal, RateError> {
        let quotes = self
            .quotes
            .read()
            .map_err(|_| RateError::Source("lock poisoned".to_string()))?;
        quotes
            .get(&currency_id)
            .copied()
            .ok_or(RateError::Unavailable { currency_id, as_of })
    }
}
