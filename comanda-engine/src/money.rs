//! Money calculation helpers using rust_decimal for precision
//!
//! Every monetary value in the engine is an exact decimal with two
//! fractional digits; rounding is half-up and happens at every operation
//! that divides.

use rust_decimal::prelude::*;

/// Rounding precision for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Round a monetary value to 2 decimal places, half-up
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `pct` percent of `base`, rounded half-up to 2 decimal places
#[inline]
pub fn percent_of(base: Decimal, pct: Decimal) -> Decimal {
    round_money(base * pct / Decimal::ONE_HUNDRED)
}

/// Proportional share `total * part / whole`, rounded half-up to 2 decimal
/// places. `whole` must be non-zero.
#[inline]
pub fn proportional_share(total: Decimal, part: Decimal, whole: Decimal) -> Decimal {
    round_money(total * part / whole)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(d("1.005")), d("1.01"));
        assert_eq!(round_money(d("1.004")), d("1.00"));
        assert_eq!(round_money(d("-1.005")), d("-1.01"));
        assert_eq!(round_money(d("2.675")), d("2.68"));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(d("2500"), d("20")), d("500"));
        assert_eq!(percent_of(d("1800"), d("50")), d("900"));
        // Half-up at the cent
        assert_eq!(percent_of(d("0.10"), d("25")), d("0.03"));
    }

    #[test]
    fn test_proportional_share() {
        assert_eq!(proportional_share(d("100"), d("1"), d("3")), d("33.33"));
        assert_eq!(proportional_share(d("100"), d("2"), d("3")), d("66.67"));
    }
}
