//! Variant normalizer
//!
//! Pure function of (selected product, requested extras, sibling variants,
//! structural-modifier ids). Adding a meat patty to a single burger must
//! yield the double, not a single with a loose patty: the sibling whose
//! structural count matches is selected and the absorbed modifiers drop out
//! of the extras list. Idempotent: normalizing a normalized selection
//! changes nothing.

use shared::models::Product;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Normalization failure; the caller surfaces it as
/// `StructuralExtraNotAllowed` with the product name
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// Structural extras were requested but no sibling variant carries a
    /// structural count to absorb them into
    #[error("no variant of '{0}' can absorb structural extras")]
    NoUpgradePath(String),
}

/// Result of normalizing a selection
#[derive(Debug, Clone)]
pub struct Normalization {
    /// The (possibly upgraded) product to sell
    pub product: Product,
    /// Requested extras minus the absorbed structural modifiers
    pub extras: Vec<Uuid>,
    /// Whether a variant upgrade happened
    pub converted: bool,
}

impl Normalization {
    fn unchanged(product: Product, extras: Vec<Uuid>) -> Self {
        Self {
            product,
            extras,
            converted: false,
        }
    }
}

/// Upgrade `selected` when structural modifiers are present among the
/// requested extras.
///
/// The target structural count is the selected variant's count plus the
/// number of structural extras; the sibling matching it exactly wins, and
/// with no exact match the structurally largest sibling absorbs as many
/// modifiers as it can. Leftover extras (structural or not) stay on the
/// line.
pub fn normalize(
    selected: Product,
    requested_extras: Vec<Uuid>,
    siblings: &[Product],
    structural_modifier_ids: &HashSet<Uuid>,
) -> Result<Normalization, NormalizeError> {
    if selected.variant_group_id.is_none() {
        return Ok(Normalization::unchanged(selected, requested_extras));
    }

    let structural_requested = requested_extras
        .iter()
        .filter(|id| structural_modifier_ids.contains(id))
        .count() as i32;
    if structural_requested == 0 {
        return Ok(Normalization::unchanged(selected, requested_extras));
    }

    let selected_count = selected.structural_modifier_count.unwrap_or(0);
    let target_count = selected_count + structural_requested;

    let sized: Vec<&Product> = siblings
        .iter()
        .filter(|p| p.structural_modifier_count.is_some())
        .collect();
    if sized.is_empty() {
        return Err(NormalizeError::NoUpgradePath(selected.name));
    }

    let variant = sized
        .iter()
        .find(|p| p.structural_modifier_count == Some(target_count))
        .copied()
        .unwrap_or_else(|| {
            // No exact fit: the structurally largest sibling absorbs what
            // it can
            sized
                .iter()
                .max_by_key(|p| p.structural_modifier_count)
                .copied()
                .unwrap()
        });

    let absorbed = (variant.structural_modifier_count.unwrap_or(0) - selected_count).max(0);

    // Drop the first `absorbed` structural modifiers; keep the rest
    let mut to_absorb = absorbed;
    let extras: Vec<Uuid> = requested_extras
        .into_iter()
        .filter(|id| {
            if to_absorb > 0 && structural_modifier_ids.contains(id) {
                to_absorb -= 1;
                false
            } else {
                true
            }
        })
        .collect();

    let converted = variant.id != selected.id;
    Ok(Normalization {
        product: variant.clone(),
        extras,
        converted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn burger(name: &str, group: Uuid, count: Option<i32>, price: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            local_id: Uuid::new_v4(),
            name: name.to_string(),
            price: d(price),
            is_active: true,
            color: "#FFFFFF".to_string(),
            category_id: None,
            variant_group_id: Some(group),
            structural_modifier_count: count,
            is_extra: false,
            is_structural_modifier: false,
            admits_extras: true,
            requires_configuration: false,
            stock_tracked: false,
            current_stock: 0,
        }
    }

    fn patty_id() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_no_variant_group_passes_through() {
        let mut plain = burger("Tostado", Uuid::new_v4(), None, "1500");
        plain.variant_group_id = None;
        let extras = vec![Uuid::new_v4()];

        let result = normalize(plain.clone(), extras.clone(), &[], &HashSet::new()).unwrap();
        assert_eq!(result.product.id, plain.id);
        assert_eq!(result.extras, extras);
        assert!(!result.converted);
    }

    #[test]
    fn test_no_structural_extras_passes_through() {
        let group = Uuid::new_v4();
        let simple = burger("Hamburguesa simple", group, Some(1), "10000");
        let bacon = Uuid::new_v4();

        let result = normalize(simple.clone(), vec![bacon], &[], &HashSet::new()).unwrap();
        assert_eq!(result.product.id, simple.id);
        assert!(!result.converted);
    }

    #[test]
    fn test_single_plus_patty_becomes_double() {
        let group = Uuid::new_v4();
        let simple = burger("Hamburguesa simple", group, Some(1), "10000");
        let double = burger("Hamburguesa doble", group, Some(2), "13000");
        let triple = burger("Hamburguesa triple", group, Some(3), "16000");
        let patty = patty_id();
        let structural: HashSet<Uuid> = [patty].into();

        let siblings = vec![simple.clone(), double.clone(), triple];
        let result = normalize(simple, vec![patty], &siblings, &structural).unwrap();

        assert_eq!(result.product.id, double.id);
        assert!(result.extras.is_empty());
        assert!(result.converted);
    }

    #[test]
    fn test_overflow_lands_on_largest_variant_keeping_leftovers() {
        let group = Uuid::new_v4();
        let simple = burger("Hamburguesa simple", group, Some(1), "10000");
        let double = burger("Hamburguesa doble", group, Some(2), "13000");
        let patty = patty_id();
        let structural: HashSet<Uuid> = [patty].into();

        // Two patties on a single: target 3, no triple exists, the double
        // absorbs one and the second patty stays as an extra
        let siblings = vec![simple.clone(), double.clone()];
        let result = normalize(simple, vec![patty, patty], &siblings, &structural).unwrap();

        assert_eq!(result.product.id, double.id);
        assert_eq!(result.extras, vec![patty]);
        assert!(result.converted);
    }

    #[test]
    fn test_non_structural_extras_survive_conversion() {
        let group = Uuid::new_v4();
        let simple = burger("Hamburguesa simple", group, Some(1), "10000");
        let double = burger("Hamburguesa doble", group, Some(2), "13000");
        let patty = patty_id();
        let bacon = Uuid::new_v4();
        let structural: HashSet<Uuid> = [patty].into();

        let siblings = vec![simple.clone(), double.clone()];
        let result = normalize(simple, vec![bacon, patty], &siblings, &structural).unwrap();

        assert_eq!(result.product.id, double.id);
        assert_eq!(result.extras, vec![bacon]);
    }

    #[test]
    fn test_no_sized_sibling_is_an_error() {
        let group = Uuid::new_v4();
        let odd = burger("Especial", group, None, "12000");
        let patty = patty_id();
        let structural: HashSet<Uuid> = [patty].into();

        let siblings = vec![odd.clone()];
        let result = normalize(odd, vec![patty], &siblings, &structural);
        assert!(matches!(result, Err(NormalizeError::NoUpgradePath(_))));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let group = Uuid::new_v4();
        let simple = burger("Hamburguesa simple", group, Some(1), "10000");
        let double = burger("Hamburguesa doble", group, Some(2), "13000");
        let patty = patty_id();
        let structural: HashSet<Uuid> = [patty].into();
        let siblings = vec![simple.clone(), double.clone()];

        let once = normalize(simple, vec![patty], &siblings, &structural).unwrap();
        let twice = normalize(once.product.clone(), once.extras.clone(), &siblings, &structural)
            .unwrap();

        assert_eq!(twice.product.id, once.product.id);
        assert_eq!(twice.extras, once.extras);
        assert!(!twice.converted);
    }
}
