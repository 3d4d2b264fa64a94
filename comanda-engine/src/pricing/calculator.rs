//! Per-strategy discount amounts
//!
//! Given unit price `p`, quantity `n` and line subtotal `s = p * n` (extras
//! always excluded):
//!
//! | Strategy         | Discount                                  |
//! |------------------|-------------------------------------------|
//! | DirectDiscount   | PERCENT: `s*v/100`; FIXED: `min(v*n, s)`  |
//! | QuantityBundle   | `floor(n/take) * (take-pay) * p`          |
//! | ComboConditional | `s*b/100` (trigger gating is eligibility) |
//! | FixedPricePack   | `floor(n/k) * (k*p - q)`, clamped to >= 0 |

use crate::money::{percent_of, round_money};
use rust_decimal::Decimal;
use shared::models::{DiscountMode, Strategy};

/// Discount a strategy yields over `quantity` units at `unit_price`
pub fn strategy_discount(strategy: &Strategy, unit_price: Decimal, quantity: u32) -> Decimal {
    let qty = Decimal::from(quantity);
    let subtotal = unit_price * qty;

    match strategy {
        Strategy::DirectDiscount { mode, value } => match mode {
            DiscountMode::Percent => percent_of(subtotal, *value),
            DiscountMode::FixedAmount => round_money((*value * qty).min(subtotal)),
        },
        Strategy::QuantityBundle { take, pay } => {
            if *take == 0 {
                return Decimal::ZERO;
            }
            let cycles = quantity / take;
            let free_units = cycles * (take.saturating_sub(*pay));
            round_money(Decimal::from(free_units) * unit_price)
        }
        Strategy::ComboConditional { benefit_pct, .. } => percent_of(subtotal, *benefit_pct),
        Strategy::FixedPricePack {
            activate_at,
            pack_price,
        } => {
            if *activate_at == 0 {
                return Decimal::ZERO;
            }
            let packs = quantity / activate_at;
            let per_pack = Decimal::from(*activate_at) * unit_price - *pack_price;
            round_money((Decimal::from(packs) * per_pack).max(Decimal::ZERO))
        }
    }
}

/// Units inside complete promo cycles; units beyond them never receive a
/// share of the discount during bulk distribution
pub fn in_cycle_units(strategy: &Strategy, quantity: u32) -> u32 {
    match strategy {
        Strategy::QuantityBundle { take, .. } if *take > 0 => (quantity / take) * take,
        Strategy::FixedPricePack { activate_at, .. } if *activate_at > 0 => {
            (quantity / activate_at) * activate_at
        }
        _ => quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_direct_percent() {
        let strategy = Strategy::DirectDiscount {
            mode: DiscountMode::Percent,
            value: d("20"),
        };
        assert_eq!(strategy_discount(&strategy, d("2500"), 1), d("500"));
        assert_eq!(strategy_discount(&strategy, d("2500"), 3), d("1500"));
    }

    #[test]
    fn test_direct_fixed_capped_at_subtotal() {
        let strategy = Strategy::DirectDiscount {
            mode: DiscountMode::FixedAmount,
            value: d("300"),
        };
        assert_eq!(strategy_discount(&strategy, d("1000"), 2), d("600"));
        // v*n would exceed s
        assert_eq!(strategy_discount(&strategy, d("200"), 2), d("400"));
    }

    #[test]
    fn test_quantity_bundle() {
        // 2x1: every second unit free
        let strategy = Strategy::QuantityBundle { take: 2, pay: 1 };
        assert_eq!(strategy_discount(&strategy, d("2500"), 1), d("0"));
        assert_eq!(strategy_discount(&strategy, d("2500"), 2), d("2500"));
        assert_eq!(strategy_discount(&strategy, d("2500"), 3), d("2500"));
        assert_eq!(strategy_discount(&strategy, d("2500"), 4), d("5000"));
    }

    #[test]
    fn test_combo_benefit() {
        let strategy = Strategy::ComboConditional {
            min_trigger_qty: 1,
            benefit_pct: d("50"),
        };
        assert_eq!(strategy_discount(&strategy, d("1800"), 1), d("900"));
    }

    #[test]
    fn test_fixed_price_pack() {
        // 2 units for 22000 on a 13000 product
        let strategy = Strategy::FixedPricePack {
            activate_at: 2,
            pack_price: d("22000"),
        };
        assert_eq!(strategy_discount(&strategy, d("13000"), 1), d("0"));
        assert_eq!(strategy_discount(&strategy, d("13000"), 2), d("4000"));
        assert_eq!(strategy_discount(&strategy, d("13000"), 3), d("4000"));
        assert_eq!(strategy_discount(&strategy, d("13000"), 4), d("8000"));
    }

    #[test]
    fn test_fixed_price_pack_never_negative() {
        // Pack priced above the regular total clamps to zero
        let strategy = Strategy::FixedPricePack {
            activate_at: 2,
            pack_price: d("30000"),
        };
        assert_eq!(strategy_discount(&strategy, d("13000"), 2), d("0"));
    }

    #[test]
    fn test_in_cycle_units() {
        let bundle = Strategy::QuantityBundle { take: 2, pay: 1 };
        assert_eq!(in_cycle_units(&bundle, 5), 4);

        let pack = Strategy::FixedPricePack {
            activate_at: 3,
            pack_price: d("100"),
        };
        assert_eq!(in_cycle_units(&pack, 7), 6);

        let direct = Strategy::DirectDiscount {
            mode: DiscountMode::Percent,
            value: d("10"),
        };
        assert_eq!(in_cycle_units(&direct, 5), 5);
    }
}
