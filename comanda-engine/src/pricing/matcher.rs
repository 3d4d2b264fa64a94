//! Promotion matching
//!
//! Scope membership, activation criteria, and combo trigger checks. The
//! engine treats scope as opaque product-id membership; category references
//! are expanded here at evaluation setup.

use super::context::EvaluationContext;
use chrono::NaiveTime;
use shared::models::{
    ActivationCriterion, OrderItem, Product, Promotion, PromotionState, ReferenceKind, ScopeRole,
    Strategy,
};
use std::collections::HashSet;
use uuid::Uuid;

/// A promotion's scope resolved to concrete product ids
#[derive(Debug, Clone, Default)]
pub struct ScopeIndex {
    targets: HashSet<Uuid>,
    triggers: HashSet<Uuid>,
}

impl ScopeIndex {
    /// Expand a promotion's scope against the catalog: PRODUCT references
    /// map directly, CATEGORY references pull in every product of that
    /// category.
    pub fn build(promotion: &Promotion, catalog: &[Product]) -> Self {
        let mut index = Self::default();
        for scope_item in &promotion.scope {
            let bucket = match scope_item.role {
                ScopeRole::Target => &mut index.targets,
                ScopeRole::Trigger => &mut index.triggers,
            };
            match scope_item.reference_kind {
                ReferenceKind::Product => {
                    bucket.insert(scope_item.reference_id);
                }
                ReferenceKind::Category => {
                    bucket.extend(
                        catalog
                            .iter()
                            .filter(|p| p.category_id == Some(scope_item.reference_id))
                            .map(|p| p.id),
                    );
                }
            }
        }
        index
    }

    pub fn is_target(&self, product_id: Uuid) -> bool {
        self.targets.contains(&product_id)
    }

    pub fn has_target(&self) -> bool {
        !self.targets.is_empty()
    }

    /// Cumulative quantity of trigger products across the order
    pub fn trigger_quantity(&self, items: &[&OrderItem]) -> u32 {
        items
            .iter()
            .filter(|i| self.triggers.contains(&i.product_id))
            .map(|i| i.quantity)
            .sum()
    }
}

/// Whether one criterion holds in the given context
pub fn criterion_met(criterion: &ActivationCriterion, ctx: &EvaluationContext) -> bool {
    match criterion {
        ActivationCriterion::Temporal {
            start_date,
            end_date,
            weekdays,
            start_time,
            end_time,
        } => {
            if ctx.date < *start_date || ctx.date > *end_date {
                return false;
            }
            if let Some(days) = weekdays {
                if !days.contains(&ctx.weekday) {
                    return false;
                }
            }
            if let (Some(start), Some(end)) = (start_time, end_time) {
                if !time_in_range(ctx.time, *start, *end) {
                    return false;
                }
            }
            true
        }
        ActivationCriterion::Content { product_ids } => {
            product_ids.iter().all(|id| ctx.product_ids.contains(id))
        }
        ActivationCriterion::MinAmount { threshold } => ctx.subtotal >= *threshold,
    }
}

/// Inclusive hour-range check, handling overnight ranges (e.g. 22:00-02:00)
fn time_in_range(current: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        current >= start && current <= end
    } else {
        current >= start || current <= end
    }
}

/// Full eligibility predicate for a promotion against a product in the
/// order: ACTIVE, the product is a target, every criterion holds, and the
/// combo trigger (when the strategy requires one) is present.
pub fn promotion_applies(
    promotion: &Promotion,
    scope: &ScopeIndex,
    product_id: Uuid,
    order_items: &[&OrderItem],
    ctx: &EvaluationContext,
) -> bool {
    if promotion.state != PromotionState::Active {
        return false;
    }
    if !scope.has_target() || !scope.is_target(product_id) {
        return false;
    }
    if !promotion.criteria.iter().all(|c| criterion_met(c, ctx)) {
        return false;
    }
    if let Strategy::ComboConditional {
        min_trigger_qty, ..
    } = &promotion.strategy
    {
        if scope.trigger_quantity(order_items) < *min_trigger_qty {
            return false;
        }
    }
    true
}
