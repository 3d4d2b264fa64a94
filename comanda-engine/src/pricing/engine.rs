//! Promotion application paths
//!
//! Add-time: compute the winning promotion for the single incoming line and
//! snapshot it. Bulk: after quantity changes and removals, clear every
//! snapshot, regroup by product, and redistribute the winning discount over
//! the units inside complete promo cycles, cent-exact.

use super::calculator::{in_cycle_units, strategy_discount};
use super::context::EvaluationContext;
use super::matcher::{ScopeIndex, promotion_applies};
use crate::money::proportional_share;
use rust_decimal::Decimal;
use shared::models::{Order, OrderItem, Product, Promotion, PromotionSnapshot};
use uuid::Uuid;

/// A promotion with its scope resolved against the catalog, built once per
/// operation
#[derive(Debug, Clone)]
pub struct ActivePromotion {
    pub promotion: Promotion,
    pub scope: ScopeIndex,
}

/// Resolve scopes for a batch of promotions
pub fn build_active(promotions: Vec<Promotion>, catalog: &[Product]) -> Vec<ActivePromotion> {
    promotions
        .into_iter()
        .map(|promotion| {
            let scope = ScopeIndex::build(&promotion, catalog);
            ActivePromotion { promotion, scope }
        })
        .collect()
}

fn snapshot_for(active: &ActivePromotion, amount: Decimal) -> PromotionSnapshot {
    PromotionSnapshot {
        discount_amount: amount,
        promotion_id: Some(active.promotion.id),
        promotion_name: Some(active.promotion.name.clone()),
    }
}

/// Among eligible promotions with a strictly positive discount, highest
/// priority wins; the promotion id keeps the pick stable within a pass.
fn pick_winner<'a>(
    candidates: impl Iterator<Item = (&'a ActivePromotion, Decimal)>,
) -> Option<(&'a ActivePromotion, Decimal)> {
    candidates
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .max_by_key(|(active, _)| (active.promotion.priority, active.promotion.id))
}

/// Add-time path: winning promotion for a single line. A line carrying any
/// extra is bespoke and bypasses evaluation entirely.
pub fn evaluate_line(
    order_items: &[&OrderItem],
    product_id: Uuid,
    unit_price: Decimal,
    quantity: u32,
    has_extras: bool,
    active: &[ActivePromotion],
    ctx: &EvaluationContext,
) -> PromotionSnapshot {
    if has_extras {
        return PromotionSnapshot::none();
    }

    let winner = pick_winner(active.iter().filter_map(|ap| {
        if promotion_applies(&ap.promotion, &ap.scope, product_id, order_items, ctx) {
            Some((ap, strategy_discount(&ap.promotion.strategy, unit_price, quantity)))
        } else {
            None
        }
    }));

    match winner {
        Some((ap, amount)) => snapshot_for(ap, amount),
        None => PromotionSnapshot::none(),
    }
}

/// Bulk recomputation path, triggered by quantity changes and removals.
///
/// 1. Clear all promotion snapshots.
/// 2. Group items by product, excluding lines with extras.
/// 3. Per group: evaluate with the cumulative quantity, pick the winner,
///    greedily assign in-cycle units to the largest lines first, and
///    distribute the discount proportionally with the residue on the last
///    participating line so the group reconciles to the cent.
pub fn recompute_order(order: &mut Order, active: &[ActivePromotion], ctx: &EvaluationContext) {
    for item in &mut order.items {
        item.promotion = PromotionSnapshot::none();
    }

    // Group line indexes by product in first-appearance order
    let mut group_keys: Vec<Uuid> = Vec::new();
    let mut groups: std::collections::HashMap<Uuid, Vec<usize>> =
        std::collections::HashMap::new();
    for (idx, item) in order.items.iter().enumerate() {
        if item.has_extras() {
            continue;
        }
        groups
            .entry(item.product_id)
            .or_insert_with(|| {
                group_keys.push(item.product_id);
                Vec::new()
            })
            .push(idx);
    }

    let items_view: Vec<&OrderItem> = order.items.iter().collect();
    let mut assignments: Vec<(usize, PromotionSnapshot)> = Vec::new();

    for product_id in group_keys {
        let indexes = &groups[&product_id];
        let cumulative_qty: u32 = indexes.iter().map(|&i| items_view[i].quantity).sum();
        // Snapshot prices are identical across the group by construction
        let unit_price = items_view[indexes[0]].unit_price;

        let winner = pick_winner(active.iter().filter_map(|ap| {
            if promotion_applies(&ap.promotion, &ap.scope, product_id, &items_view, ctx) {
                Some((
                    ap,
                    strategy_discount(&ap.promotion.strategy, unit_price, cumulative_qty),
                ))
            } else {
                None
            }
        }));
        let Some((winning, total_discount)) = winner else {
            continue;
        };

        let in_cycle = in_cycle_units(&winning.promotion.strategy, cumulative_qty);
        if in_cycle == 0 {
            continue;
        }

        // Largest lines first; stable sort keeps insertion order on ties
        let mut sorted = indexes.clone();
        sorted.sort_by(|&a, &b| items_view[b].quantity.cmp(&items_view[a].quantity));

        let mut remaining = in_cycle;
        let mut participating: Vec<(usize, u32)> = Vec::new();
        for idx in sorted {
            if remaining == 0 {
                break;
            }
            let assigned = items_view[idx].quantity.min(remaining);
            remaining -= assigned;
            participating.push((idx, assigned));
        }

        // Proportional split, residue on the last participating line
        let assigned_total = Decimal::from(in_cycle);
        let mut distributed = Decimal::ZERO;
        let last = participating.len() - 1;
        for (pos, (idx, units)) in participating.iter().enumerate() {
            let amount = if pos == last {
                total_discount - distributed
            } else {
                proportional_share(total_discount, Decimal::from(*units), assigned_total)
            };
            distributed += amount;
            assignments.push((*idx, snapshot_for(winning, amount)));
        }
    }

    for (idx, snapshot) in assignments {
        order.items[idx].promotion = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use shared::models::{
        ActivationCriterion, DiscountMode, PromotionState, ReferenceKind, ScopeItem,
        ScopeRole, Strategy,
    };

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn item(product_id: Uuid, unit_price: &str, quantity: u32) -> OrderItem {
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

    fn order_with(items: Vec<OrderItem>) -> Order {
        let mut order = Order::open(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 1, at());
        order.items = items;
        order
    }

    fn promo(
        name: &str,
        priority: u32,
        strategy: Strategy,
        scope: Vec<ScopeItem>,
    ) -> ActivePromotion {
        let promotion = Promotion {
            id: Uuid::new_v4(),
            local_id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            priority,
            state: PromotionState::Active,
            strategy,
            criteria: vec![],
            scope,
        };
        let scope = ScopeIndex::build(&promotion, &[]);
        ActivePromotion { promotion, scope }
    }

    fn target(product_id: Uuid) -> ScopeItem {
        ScopeItem {
            reference_id: product_id,
            reference_kind: ReferenceKind::Product,
            role: ScopeRole::Target,
        }
    }

    fn trigger(product_id: Uuid) -> ScopeItem {
        ScopeItem {
            reference_id: product_id,
            reference_kind: ReferenceKind::Product,
            role: ScopeRole::Trigger,
        }
    }

    #[test]
    fn test_happy_hour_percent() {
        // Cerveza 2500 with DirectDiscount(PERCENT, 20) in a covering window
        let cerveza = Uuid::new_v4();
        let mut ap = promo(
            "Happy hour",
            10,
            Strategy::DirectDiscount {
                mode: DiscountMode::Percent,
                value: d("20"),
            },
            vec![target(cerveza)],
        );
        ap.promotion.criteria = vec![ActivationCriterion::Temporal {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            weekdays: None,
            start_time: None,
            end_time: None,
        }];

        let order = order_with(vec![]);
        let candidate = item(cerveza, "2500", 1);
        let ctx = EvaluationContext::from_order_with_candidate(&order, &candidate, at());

        let snapshot = evaluate_line(
            &[&candidate],
            cerveza,
            d("2500"),
            1,
            false,
            &[ap],
            &ctx,
        );
        assert_eq!(snapshot.discount_amount, d("500"));
        assert_eq!(snapshot.promotion_name.as_deref(), Some("Happy hour"));
    }

    #[test]
    fn test_combo_requires_trigger() {
        let torta = Uuid::new_v4();
        let licuado = Uuid::new_v4();
        let ap = promo(
            "Combo merienda",
            10,
            Strategy::ComboConditional {
                min_trigger_qty: 1,
                benefit_pct: d("50"),
            },
            vec![trigger(torta), target(licuado)],
        );

        // With a Torta on the table the Licuado gets 50%
        let order = order_with(vec![item(torta, "2000", 1)]);
        let candidate = item(licuado, "1800", 1);
        let ctx = EvaluationContext::from_order_with_candidate(&order, &candidate, at());
        let view: Vec<&OrderItem> = order.items.iter().chain(std::iter::once(&candidate)).collect();
        let snapshot = evaluate_line(&view, licuado, d("1800"), 1, false, std::slice::from_ref(&ap), &ctx);
        assert_eq!(snapshot.discount_amount, d("900"));

        // Without the trigger, nothing applies
        let empty_order = order_with(vec![]);
        let ctx = EvaluationContext::from_order_with_candidate(&empty_order, &candidate, at());
        let snapshot = evaluate_line(
            &[&candidate],
            licuado,
            d("1800"),
            1,
            false,
            std::slice::from_ref(&ap),
            &ctx,
        );
        assert_eq!(snapshot.discount_amount, Decimal::ZERO);
        assert!(snapshot.promotion_id.is_none());
    }

    #[test]
    fn test_priority_wins_only_with_positive_discount() {
        let cerveza = Uuid::new_v4();
        let bundle = promo(
            "2x1",
            10,
            Strategy::QuantityBundle { take: 2, pay: 1 },
            vec![target(cerveza)],
        );
        let direct = promo(
            "Siempre 10",
            5,
            Strategy::DirectDiscount {
                mode: DiscountMode::Percent,
                value: d("10"),
            },
            vec![target(cerveza)],
        );
        let active = vec![bundle, direct];

        // qty=2: the bundle (priority 10) wins with one unit free
        let order = order_with(vec![]);
        let two = item(cerveza, "2500", 2);
        let ctx = EvaluationContext::from_order_with_candidate(&order, &two, at());
        let snapshot = evaluate_line(&[&two], cerveza, d("2500"), 2, false, &active, &ctx);
        assert_eq!(snapshot.discount_amount, d("2500"));
        assert_eq!(snapshot.promotion_name.as_deref(), Some("2x1"));

        // qty=1: the bundle yields zero, so the lower-priority direct applies
        let one = item(cerveza, "2500", 1);
        let ctx = EvaluationContext::from_order_with_candidate(&order, &one, at());
        let snapshot = evaluate_line(&[&one], cerveza, d("2500"), 1, false, &active, &ctx);
        assert_eq!(snapshot.discount_amount, d("250"));
        assert_eq!(snapshot.promotion_name.as_deref(), Some("Siempre 10"));
    }

    #[test]
    fn test_line_with_extras_bypasses_evaluation() {
        let cerveza = Uuid::new_v4();
        let ap = promo(
            "Happy hour",
            10,
            Strategy::DirectDiscount {
                mode: DiscountMode::Percent,
                value: d("20"),
            },
            vec![target(cerveza)],
        );

        let candidate = item(cerveza, "2500", 1);
        let order = order_with(vec![]);
        let ctx = EvaluationContext::from_order_with_candidate(&order, &candidate, at());
        let snapshot = evaluate_line(
            &[&candidate],
            cerveza,
            d("2500"),
            1,
            true,
            std::slice::from_ref(&ap),
            &ctx,
        );
        assert!(snapshot.is_none());
    }

    #[test]
    fn test_cross_line_aggregation_assigns_cycles_to_largest_line() {
        // Two Cheeseburger lines (qty 2 and qty 1, distinct observations)
        // under FixedPricePack(2, 22000): the qty=2 line takes the whole
        // cycle, the qty=1 line keeps no promo.
        let burger = Uuid::new_v4();
        let ap = promo(
            "Pack parrilla",
            10,
            Strategy::FixedPricePack {
                activate_at: 2,
                pack_price: d("22000"),
            },
            vec![target(burger)],
        );

        let mut second = item(burger, "13000", 1);
        second.observation = Some("sin cebolla".to_string());
        let mut order = order_with(vec![item(burger, "13000", 2), second]);

        let ctx = EvaluationContext::from_order(&order, at());
        recompute_order(&mut order, std::slice::from_ref(&ap), &ctx);

        assert_eq!(order.items[0].promotion.discount_amount, d("4000"));
        assert!(order.items[1].promotion.is_none());
    }

    #[test]
    fn test_bulk_distribution_reconciles_to_the_cent() {
        // Three one-unit lines under a 33.33%-style split: per-line shares
        // must sum exactly to the group discount.
        let cerveza = Uuid::new_v4();
        let ap = promo(
            "Tercio",
            10,
            Strategy::DirectDiscount {
                mode: DiscountMode::Percent,
                value: d("10"),
            },
            vec![target(cerveza)],
        );

        let mut a = item(cerveza, "33.35", 1);
        a.observation = Some("a".to_string());
        let mut b = item(cerveza, "33.35", 1);
        b.observation = Some("b".to_string());
        let mut c = item(cerveza, "33.35", 1);
        c.observation = Some("c".to_string());
        let mut order = order_with(vec![a, b, c]);

        let ctx = EvaluationContext::from_order(&order, at());
        recompute_order(&mut order, std::slice::from_ref(&ap), &ctx);

        // Group discount: 10% of 100.05 = 10.01 (half-up)
        let total: Decimal = order
            .items
            .iter()
            .map(|i| i.promotion.discount_amount)
            .sum();
        assert_eq!(total, d("10.01"));
        // First two get the rounded proportional share, the last absorbs
        // the residue
        assert_eq!(order.items[0].promotion.discount_amount, d("3.34"));
        assert_eq!(order.items[1].promotion.discount_amount, d("3.34"));
        assert_eq!(order.items[2].promotion.discount_amount, d("3.33"));
    }

    #[test]
    fn test_recompute_clears_stale_snapshots() {
        let cerveza = Uuid::new_v4();
        let mut line = item(cerveza, "2500", 1);
        line.promotion = PromotionSnapshot {
            discount_amount: d("500"),
            promotion_id: Some(Uuid::new_v4()),
            promotion_name: Some("Stale".to_string()),
        };
        let mut order = order_with(vec![line]);

        let ctx = EvaluationContext::from_order(&order, at());
        recompute_order(&mut order, &[], &ctx);
        assert!(order.items[0].promotion.is_none());
    }

    #[test]
    fn test_inactive_promotion_never_applies() {
        let cerveza = Uuid::new_v4();
        let mut ap = promo(
            "Apagada",
            10,
            Strategy::DirectDiscount {
                mode: DiscountMode::Percent,
                value: d("20"),
            },
            vec![target(cerveza)],
        );
        ap.promotion.state = PromotionState::Inactive;

        let candidate = item(cerveza, "2500", 1);
        let order = order_with(vec![]);
        let ctx = EvaluationContext::from_order_with_candidate(&order, &candidate, at());
        let snapshot = evaluate_line(
            &[&candidate],
            cerveza,
            d("2500"),
            1,
            false,
            std::slice::from_ref(&ap),
            &ctx,
        );
        assert!(snapshot.is_none());
    }

    #[test]
    fn test_bundle_cycles_split_across_merged_and_noted_lines() {
        // 2x1 over lines qty=3 and qty=2 (distinct observations):
        // cumulative 5, in-cycle 4, total discount 2 units.
        // Greedy: qty=3 line takes 3 in-cycle units, qty=2 line takes 1.
        let cerveza = Uuid::new_v4();
        let ap = promo(
            "2x1",
            10,
            Strategy::QuantityBundle { take: 2, pay: 1 },
            vec![target(cerveza)],
        );

        let mut noted = item(cerveza, "1000", 2);
        noted.observation = Some("bien fria".to_string());
        let mut order = order_with(vec![item(cerveza, "1000", 3), noted]);

        let ctx = EvaluationContext::from_order(&order, at());
        recompute_order(&mut order, std::slice::from_ref(&ap), &ctx);

        // Total discount: floor(5/2) * 1 * 1000 = 2000
        // Shares: 2000 * 3/4 = 1500, residue 500 on the second line
        assert_eq!(order.items[0].promotion.discount_amount, d("1500"));
        assert_eq!(order.items[1].promotion.discount_amount, d("500"));
    }
}
