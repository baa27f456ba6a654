//! Base-currency equivalence for frozen exchange-rate snapshots.
//!
//! A document carries its native-currency total plus the exchange rate that
//! was current the last time the document was editable. The base-currency
//! equivalent is always `total × rate`, rounded half-up to the base
//! currency's minor-unit precision. Once a document leaves draft the rate and
//! equivalent are frozen; later market moves must not rewrite history.

use rust_decimal::{Decimal, RoundingStrategy};

use salesdoc_core::{DomainError, DomainResult};

/// Fractional digits carried by exchange rates. Rates with fewer digits are
/// zero-padded up; rates with more are carried as-is and never rounded
/// before multiplication.
pub const RATE_SCALE: u32 = 6;

/// Minor-unit precision of the organization's base currency.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Validate and normalize an exchange rate.
pub fn validate_rate(rate: Decimal) -> DomainResult<Decimal> {
    if rate <= Decimal::ZERO {
        return Err(DomainError::validation("exchange rate must be positive"));
    }
    let mut rate = rate;
    if rate.scale() < RATE_SCALE {
        rate.rescale(RATE_SCALE);
    }
    Ok(rate)
}

/// Round a native-currency amount to minor-unit precision, half-up.
pub fn round_minor(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Base-currency equivalent of a native total under a frozen rate.
///
/// The multiplication runs at full precision; only the product is rounded.
pub fn equivalent_amount(total: Decimal, rate: Decimal) -> Decimal {
    round_minor(total * rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn equivalent_rounds_half_up_to_two_decimals() {
        assert_eq!(
            equivalent_amount(dec!(1000.00), dec!(2.654321)),
            dec!(2654.32)
        );
        // 10.00 * 1.234550 = 12.3455 -> half-up to 12.35
        assert_eq!(equivalent_amount(dec!(10.00), dec!(1.234550)), dec!(12.35));
    }

    #[test]
    fn rate_is_padded_to_six_digits_without_rounding() {
        let rate = validate_rate(dec!(2.5)).unwrap();
        assert_eq!(rate, dec!(2.500000));
        assert_eq!(rate.scale(), RATE_SCALE);

        // More than six digits is carried as-is.
        let precise = validate_rate(dec!(0.1234567)).unwrap();
        assert_eq!(precise, dec!(0.1234567));
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        assert!(validate_rate(Decimal::ZERO).is_err());
        assert!(validate_rate(dec!(-1.000000)).is_err());
    }
}
