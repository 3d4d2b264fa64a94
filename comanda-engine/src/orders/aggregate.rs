//! Order state machine and item operations
//!
//! OPEN → CLOSED → (reopen) → OPEN. Once CLOSED the accounting snapshot is
//! frozen and no item mutation is allowed. Every operation validates state
//! first and leaves the order untouched on failure.

use super::totals;
use crate::money::round_money;
use rust_decimal::Decimal;
use shared::error::{DomainError, DomainResult};
use shared::models::{
    DiscountMode, ManualDiscount, Order, OrderItem, OrderState, Payment,
};
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Result of adding an item to an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Quantities were folded into an existing functionally-identical line
    Merged(Uuid),
    /// A new line was appended
    Appended(Uuid),
}

impl AddOutcome {
    pub fn item_id(&self) -> Uuid {
        match self {
            Self::Merged(id) | Self::Appended(id) => *id,
        }
    }
}

/// Fail with `OrderImmutable` unless the order is OPEN
pub fn ensure_open(order: &Order) -> DomainResult<()> {
    if order.state != OrderState::Open {
        return Err(DomainError::OrderImmutable);
    }
    Ok(())
}

/// Extras compared as a multiset: two lines merge only when they carry
/// exactly the same extras, regardless of order
fn extras_multiset(item: &OrderItem) -> Vec<(Uuid, Decimal)> {
    let mut extras: Vec<(Uuid, Decimal)> = item
        .extras
        .iter()
        .map(|e| (e.product_id, e.price))
        .collect();
    extras.sort();
    extras
}

/// Two lines are functionally identical when product, extras multiset and
/// observation match and neither carries a manual line discount
fn mergeable(existing: &OrderItem, incoming: &OrderItem) -> bool {
    existing.product_id == incoming.product_id
        && existing.observation == incoming.observation
        && existing.line_discount.is_none()
        && incoming.line_discount.is_none()
        && extras_multiset(existing) == extras_multiset(incoming)
}

/// Add a line to an OPEN order, merging into an existing identical line
/// when possible. The caller runs promotion recomputation after a merge.
pub fn add_item(order: &mut Order, item: OrderItem) -> DomainResult<AddOutcome> {
    ensure_open(order)?;
    if item.quantity == 0 {
        return Err(DomainError::validation("quantity", "must be at least 1"));
    }

    if let Some(existing) = order.items.iter_mut().find(|e| mergeable(e, &item)) {
        existing.quantity += item.quantity;
        return Ok(AddOutcome::Merged(existing.id));
    }

    let id = item.id;
    order.items.push(item);
    Ok(AddOutcome::Appended(id))
}

/// Change a line's quantity. The caller runs promotion recomputation.
pub fn modify_quantity(order: &mut Order, item_id: Uuid, new_qty: u32) -> DomainResult<()> {
    ensure_open(order)?;
    if new_qty == 0 {
        return Err(DomainError::validation("quantity", "must be at least 1"));
    }
    let item = order
        .item_mut(item_id)
        .ok_or_else(|| DomainError::not_found("order item", item_id))?;
    item.quantity = new_qty;
    Ok(())
}

/// Remove a line. The caller runs promotion recomputation.
pub fn remove_item(order: &mut Order, item_id: Uuid) -> DomainResult<OrderItem> {
    ensure_open(order)?;
    let idx = order
        .items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| DomainError::not_found("order item", item_id))?;
    Ok(order.items.remove(idx))
}

fn validate_discount(discount: &ManualDiscount) -> DomainResult<()> {
    if discount.value <= Decimal::ZERO {
        return Err(DomainError::validation("value", "must be positive"));
    }
    if discount.mode == DiscountMode::Percent && discount.value > Decimal::ONE_HUNDRED {
        return Err(DomainError::validation("value", "percent must not exceed 100"));
    }
    Ok(())
}

/// Grant a manual discount on one line
pub fn apply_line_discount(
    order: &mut Order,
    item_id: Uuid,
    discount: ManualDiscount,
) -> DomainResult<()> {
    ensure_open(order)?;
    validate_discount(&discount)?;

    let item = order
        .item_mut(item_id)
        .ok_or_else(|| DomainError::not_found("order item", item_id))?;

    if discount.mode == DiscountMode::FixedAmount {
        let basis = totals::line_after_promo(item);
        if discount.value > basis {
            return Err(DomainError::validation(
                "value",
                "discount would drive the line total below zero",
            ));
        }
    }

    item.line_discount = Some(discount);
    Ok(())
}

/// Grant a manual discount on the whole order
pub fn apply_global_discount(order: &mut Order, discount: ManualDiscount) -> DomainResult<()> {
    ensure_open(order)?;
    validate_discount(&discount)?;

    if discount.mode == DiscountMode::FixedAmount {
        let basis: Decimal = order.items.iter().map(totals::line_after_manual).sum();
        if discount.value > basis {
            return Err(DomainError::validation(
                "value",
                "discount would drive the order total below zero",
            ));
        }
    }

    order.global_discount = Some(discount);
    Ok(())
}

/// Close the order: validate the payment split against the computed final
/// total to the cent, freeze the accounting snapshot, and transition to
/// CLOSED.
pub fn close(order: &mut Order, payments: Vec<Payment>, at: NaiveDateTime) -> DomainResult<()> {
    ensure_open(order)?;

    if payments.is_empty() {
        return Err(DomainError::validation("payments", "must not be empty"));
    }
    for payment in &payments {
        if payment.amount <= Decimal::ZERO {
            return Err(DomainError::validation(
                "payments",
                "every amount must be positive",
            ));
        }
    }

    let computed = totals::compute_totals(order);
    let given = round_money(payments.iter().map(|p| p.amount).sum());
    if given != computed.final_total {
        return Err(DomainError::PaymentMismatch {
            expected: computed.final_total,
            given,
        });
    }

    order.payments = payments;
    order.totals = Some(totals::freeze(order));
    order.closed_at = Some(at);
    order.state = OrderState::Closed;
    Ok(())
}

/// Reopen a CLOSED order: payments and the accounting snapshot are cleared,
/// item history stays intact.
pub fn reopen(order: &mut Order) -> DomainResult<()> {
    if order.state != OrderState::Closed {
        return Err(DomainError::validation("state", "order is not closed"));
    }
    order.payments.clear();
    order.totals = None;
    order.closed_at = None;
    order.state = OrderState::Open;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::{ExtraLine, PaymentMedium, PromotionSnapshot};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap()
    }

    fn open_order() -> Order {
        Order::open(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 1, at())
    }

    fn line(product_id: Uuid, unit_price: &str, quantity: u32) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            product_id,
            product_name: "Test".to_string(),
            quantity,
            unit_price: d(unit_price),
            observation: None,
            extras: vec![],
            promotion: PromotionSnapshot::none(),
            line_discount: None,
        }
    }

    fn cash(amount: &str) -> Payment {
        Payment {
            medium: PaymentMedium::Cash,
            amount: d(amount),
            paid_at: at(),
        }
    }

    #[test]
    fn test_identical_lines_merge() {
        let mut order = open_order();
        let product = Uuid::new_v4();
        let first = add_item(&mut order, line(product, "1000", 2)).unwrap();
        let second = add_item(&mut order, line(product, "1000", 1)).unwrap();

        assert!(matches!(second, AddOutcome::Merged(id) if id == first.item_id()));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 3);
    }

    #[test]
    fn test_different_observation_appends() {
        let mut order = open_order();
        let product = Uuid::new_v4();
        add_item(&mut order, line(product, "1000", 2)).unwrap();

        let mut with_note = line(product, "1000", 1);
        with_note.observation = Some("sin cebolla".to_string());
        let outcome = add_item(&mut order, with_note).unwrap();

        assert!(matches!(outcome, AddOutcome::Appended(_)));
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn test_different_extras_append() {
        let mut order = open_order();
        let product = Uuid::new_v4();
        add_item(&mut order, line(product, "1000", 1)).unwrap();

        let mut with_extra = line(product, "1000", 1);
        with_extra.extras.push(ExtraLine {
            product_id: Uuid::new_v4(),
            name: "Bacon".to_string(),
            price: d("300"),
        });
        let outcome = add_item(&mut order, with_extra).unwrap();
        assert!(matches!(outcome, AddOutcome::Appended(_)));
    }

    #[test]
    fn test_line_with_manual_discount_never_merges() {
        let mut order = open_order();
        let product = Uuid::new_v4();
        let first = add_item(&mut order, line(product, "1000", 1)).unwrap();
        apply_line_discount(
            &mut order,
            first.item_id(),
            ManualDiscount {
                mode: DiscountMode::Percent,
                value: d("10"),
                reason: "regular".to_string(),
                user_id: Uuid::new_v4(),
                applied_at: at(),
            },
        )
        .unwrap();

        let outcome = add_item(&mut order, line(product, "1000", 1)).unwrap();
        assert!(matches!(outcome, AddOutcome::Appended(_)));
    }

    #[test]
    fn test_close_requires_exact_payment_sum() {
        let mut order = open_order();
        add_item(&mut order, line(Uuid::new_v4(), "2500", 2)).unwrap();

        let short = close(&mut order, vec![cash("4999.99")], at());
        assert!(matches!(short, Err(DomainError::PaymentMismatch { .. })));
        assert!(order.is_open());

        close(&mut order, vec![cash("3000"), cash("2000")], at()).unwrap();
        assert_eq!(order.state, OrderState::Closed);
        let totals = order.totals.as_ref().unwrap();
        assert_eq!(totals.final_total, d("5000"));
        assert_eq!(order.closed_at, Some(at()));
    }

    #[test]
    fn test_closed_order_rejects_mutation() {
        let mut order = open_order();
        let outcome = add_item(&mut order, line(Uuid::new_v4(), "1000", 1)).unwrap();
        close(&mut order, vec![cash("1000")], at()).unwrap();

        assert!(matches!(
            add_item(&mut order, line(Uuid::new_v4(), "500", 1)),
            Err(DomainError::OrderImmutable)
        ));
        assert!(matches!(
            modify_quantity(&mut order, outcome.item_id(), 2),
            Err(DomainError::OrderImmutable)
        ));
        assert!(matches!(
            remove_item(&mut order, outcome.item_id()),
            Err(DomainError::OrderImmutable)
        ));
    }

    #[test]
    fn test_reopen_clears_payments_and_snapshot() {
        let mut order = open_order();
        add_item(&mut order, line(Uuid::new_v4(), "1000", 1)).unwrap();
        close(&mut order, vec![cash("1000")], at()).unwrap();

        reopen(&mut order).unwrap();
        assert!(order.is_open());
        assert!(order.payments.is_empty());
        assert!(order.totals.is_none());
        assert!(order.closed_at.is_none());
        // Item history intact
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn test_reopen_requires_closed_state() {
        let mut order = open_order();
        assert!(matches!(
            reopen(&mut order),
            Err(DomainError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_fixed_line_discount_bounded_by_line_total() {
        let mut order = open_order();
        let outcome = add_item(&mut order, line(Uuid::new_v4(), "500", 1)).unwrap();

        let too_big = ManualDiscount {
            mode: DiscountMode::FixedAmount,
            value: d("600"),
            reason: "oops".to_string(),
            user_id: Uuid::new_v4(),
            applied_at: at(),
        };
        assert!(apply_line_discount(&mut order, outcome.item_id(), too_big).is_err());
    }

    #[test]
    fn test_percent_discount_bounded_at_100() {
        let mut order = open_order();
        let discount = ManualDiscount {
            mode: DiscountMode::Percent,
            value: d("101"),
            reason: "oops".to_string(),
            user_id: Uuid::new_v4(),
            applied_at: at(),
        };
        assert!(apply_global_discount(&mut order, discount).is_err());
    }

    #[test]
    fn test_close_then_reopen_then_close_same_snapshot() {
        let mut order = open_order();
        add_item(&mut order, line(Uuid::new_v4(), "1250.50", 2)).unwrap();
        close(&mut order, vec![cash("2501")], at()).unwrap();
        let first = order.totals.clone().unwrap();

        reopen(&mut order).unwrap();
        close(&mut order, vec![cash("2501")], at()).unwrap();
        assert_eq!(order.totals.unwrap(), first);
    }
}
