//! Monetary totals computed from order lines
//!
//! For each line:
//! `line_subtotal = unit_price * qty + Σ extra.price * qty`,
//! `line_after_promo = line_subtotal - promo_discount` (extras never
//! participate in the automatic discount),
//! `line_after_manual = line_after_promo - manual_line_discount`.
//!
//! Order level: `subtotal = Σ line_subtotal`,
//! `discount_total = Σ (line_subtotal - line_after_manual) + global_amount`,
//! `final_total = subtotal - discount_total`. A PERCENT global discount is
//! applied against `Σ line_after_manual`.

use crate::money::{percent_of, round_money};
use rust_decimal::Decimal;
use shared::models::{DiscountMode, ManualDiscount, Order, OrderItem, OrderTotals};

/// Gross value of a line: unit price plus extras, times quantity
pub fn line_subtotal(item: &OrderItem) -> Decimal {
    let qty = Decimal::from(item.quantity);
    let extras_per_unit: Decimal = item.extras.iter().map(|e| e.price).sum();
    round_money((item.unit_price + extras_per_unit) * qty)
}

/// Line value after the automatic promotion discount
pub fn line_after_promo(item: &OrderItem) -> Decimal {
    round_money(line_subtotal(item) - item.promotion.discount_amount)
}

/// Amount a manual discount takes off the given basis.
/// A FIXED discount never drives the basis below zero.
pub fn manual_discount_amount(discount: &ManualDiscount, basis: Decimal) -> Decimal {
    match discount.mode {
        DiscountMode::Percent => percent_of(basis, discount.value),
        DiscountMode::FixedAmount => round_money(discount.value).min(basis),
    }
}

/// Line value after promotion and manual line discount
pub fn line_after_manual(item: &OrderItem) -> Decimal {
    let after_promo = line_after_promo(item);
    match &item.line_discount {
        Some(discount) => {
            round_money(after_promo - manual_discount_amount(discount, after_promo))
                .max(Decimal::ZERO)
        }
        None => after_promo,
    }
}

/// Order-level totals, computed bottom-up from the lines
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedTotals {
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub final_total: Decimal,
    /// The global manual discount's computed amount
    pub global_discount_amount: Decimal,
}

/// Recalculate order totals from the line snapshots
pub fn compute_totals(order: &Order) -> ComputedTotals {
    let mut subtotal = Decimal::ZERO;
    let mut after_manual_sum = Decimal::ZERO;

    for item in &order.items {
        subtotal += line_subtotal(item);
        after_manual_sum += line_after_manual(item);
    }

    let global_discount_amount = order
        .global_discount
        .as_ref()
        .map(|d| manual_discount_amount(d, after_manual_sum))
        .unwrap_or(Decimal::ZERO);

    let discount_total = round_money(subtotal - after_manual_sum + global_discount_amount);
    let final_total = round_money(subtotal - discount_total);

    ComputedTotals {
        subtotal: round_money(subtotal),
        discount_total,
        final_total,
        global_discount_amount,
    }
}

/// Accounting snapshot to freeze at close
pub fn freeze(order: &Order) -> OrderTotals {
    let computed = compute_totals(order);
    OrderTotals {
        subtotal: computed.subtotal,
        discount_total: computed.discount_total,
        final_total: computed.final_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::{ExtraLine, OrderState, PromotionSnapshot};
    use uuid::Uuid;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(unit_price: &str, quantity: u32) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Test".to_string(),
            quantity,
            unit_price: d(unit_price),
            observation: None,
            extras: vec![],
            promotion: PromotionSnapshot::none(),
            line_discount: None,
        }
    }

    fn order_with(items: Vec<OrderItem>) -> Order {
        Order {
            id: Uuid::new_v4(),
            local_id: Uuid::new_v4(),
            table_id: Uuid::new_v4(),
            number: 1,
            state: OrderState::Open,
            opened_at: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(20, 0, 0)
                .unwrap(),
            closed_at: None,
            items,
            payments: vec![],
            global_discount: None,
            totals: None,
        }
    }

    fn manual(mode: DiscountMode, value: &str) -> ManualDiscount {
        ManualDiscount {
            mode,
            value: d(value),
            reason: "test".to_string(),
            user_id: Uuid::new_v4(),
            applied_at: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(20, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_line_subtotal_includes_extras_times_qty() {
        let mut it = item("2000", 3);
        it.extras.push(ExtraLine {
            product_id: Uuid::new_v4(),
            name: "Bacon".to_string(),
            price: d("300"),
        });
        // (2000 + 300) * 3
        assert_eq!(line_subtotal(&it), d("6900"));
    }

    #[test]
    fn test_promo_discount_excludes_extras() {
        let mut it = item("2000", 1);
        it.promotion = PromotionSnapshot {
            discount_amount: d("400"),
            promotion_id: Some(Uuid::new_v4()),
            promotion_name: Some("Promo".to_string()),
        };
        assert_eq!(line_after_promo(&it), d("1600"));
    }

    #[test]
    fn test_percent_line_discount_applies_after_promo() {
        let mut it = item("1000", 2);
        it.promotion = PromotionSnapshot {
            discount_amount: d("200"),
            promotion_id: Some(Uuid::new_v4()),
            promotion_name: Some("Promo".to_string()),
        };
        it.line_discount = Some(manual(DiscountMode::Percent, "10"));
        // subtotal 2000, after promo 1800, 10% of 1800 = 180
        assert_eq!(line_after_manual(&it), d("1620"));
    }

    #[test]
    fn test_fixed_line_discount_clamps_at_zero() {
        let mut it = item("500", 1);
        it.line_discount = Some(manual(DiscountMode::FixedAmount, "500"));
        assert_eq!(line_after_manual(&it), d("0"));
    }

    #[test]
    fn test_order_totals_reconcile() {
        let mut a = item("2500", 2);
        a.promotion = PromotionSnapshot {
            discount_amount: d("500"),
            promotion_id: Some(Uuid::new_v4()),
            promotion_name: Some("Happy hour".to_string()),
        };
        let b = item("1800", 1);
        let order = order_with(vec![a, b]);

        let totals = compute_totals(&order);
        assert_eq!(totals.subtotal, d("6800"));
        assert_eq!(totals.discount_total, d("500"));
        assert_eq!(totals.final_total, d("6300"));
    }

    #[test]
    fn test_global_percent_applies_against_sum_after_manual() {
        let mut a = item("1000", 1);
        a.line_discount = Some(manual(DiscountMode::Percent, "50"));
        let b = item("1000", 1);
        let mut order = order_with(vec![a, b]);
        order.global_discount = Some(manual(DiscountMode::Percent, "10"));

        let totals = compute_totals(&order);
        // after-manual sum = 500 + 1000 = 1500; global = 150
        assert_eq!(totals.global_discount_amount, d("150"));
        assert_eq!(totals.subtotal, d("2000"));
        assert_eq!(totals.discount_total, d("650"));
        assert_eq!(totals.final_total, d("1350"));
    }
}
