//! Promotion management

use crate::repository::{CategoryRepository, ProductRepository, PromotionRepository};
use crate::tenancy::LocalContext;
use crate::utils::validation::validate_name;
use rust_decimal::Decimal;
use shared::error::{DomainError, DomainResult};
use shared::models::{
    ActivationCriterion, Promotion, PromotionCreate, PromotionState, PromotionUpdate,
    ReferenceKind, ScopeItem, ScopeRole, Strategy,
};
use shared::util::new_id;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct PromotionService {
    promotions: Arc<dyn PromotionRepository>,
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    local: Arc<dyn LocalContext>,
}

fn validate_strategy(strategy: &Strategy) -> DomainResult<()> {
    match strategy {
        Strategy::DirectDiscount { mode, value } => {
            if *value <= Decimal::ZERO {
                return Err(DomainError::validation("value", "must be positive"));
            }
            if *mode == shared::models::DiscountMode::Percent && *value > Decimal::ONE_HUNDRED {
                return Err(DomainError::validation(
                    "value",
                    "percent must not exceed 100",
                ));
            }
        }
        Strategy::QuantityBundle { take, pay } => {
            if *take < 1 {
                return Err(DomainError::validation("take", "must be at least 1"));
            }
            if pay >= take {
                return Err(DomainError::validation(
                    "pay",
                    "must be less than the units taken",
                ));
            }
        }
        Strategy::ComboConditional {
            min_trigger_qty,
            benefit_pct,
        } => {
            if *min_trigger_qty < 1 {
                return Err(DomainError::validation(
                    "min_trigger_qty",
                    "must be at least 1",
                ));
            }
            if *benefit_pct <= Decimal::ZERO || *benefit_pct > Decimal::ONE_HUNDRED {
                return Err(DomainError::validation(
                    "benefit_pct",
                    "must be within (0, 100]",
                ));
            }
        }
        Strategy::FixedPricePack {
            activate_at,
            pack_price,
        } => {
            if *activate_at < 2 {
                return Err(DomainError::validation(
                    "activate_at",
                    "must be at least 2",
                ));
            }
            if *pack_price <= Decimal::ZERO {
                return Err(DomainError::validation("pack_price", "must be positive"));
            }
        }
    }
    Ok(())
}

fn validate_criteria(criteria: &[ActivationCriterion]) -> DomainResult<()> {
    for criterion in criteria {
        match criterion {
            ActivationCriterion::Temporal {
                start_date,
                end_date,
                weekdays,
                start_time,
                end_time,
            } => {
                if start_date > end_date {
                    return Err(DomainError::validation(
                        "start_date",
                        "must not be after end_date",
                    ));
                }
                if let Some(days) = weekdays {
                    if days.is_empty() || days.iter().any(|d| *d > 6) {
                        return Err(DomainError::validation(
                            "weekdays",
                            "must be values 0 (Sunday) to 6 (Saturday)",
                        ));
                    }
                }
                if start_time.is_some() != end_time.is_some() {
                    return Err(DomainError::validation(
                        "start_time",
                        "hour range needs both ends",
                    ));
                }
            }
            ActivationCriterion::Content { product_ids } => {
                if product_ids.is_empty() {
                    return Err(DomainError::validation(
                        "product_ids",
                        "must not be empty",
                    ));
                }
            }
            ActivationCriterion::MinAmount { threshold } => {
                if *threshold <= Decimal::ZERO {
                    return Err(DomainError::validation("threshold", "must be positive"));
                }
            }
        }
    }
    Ok(())
}

impl PromotionService {
    pub fn new(
        promotions: Arc<dyn PromotionRepository>,
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        local: Arc<dyn LocalContext>,
    ) -> Self {
        Self {
            promotions,
            products,
            categories,
            local,
        }
    }

    pub async fn create(&self, payload: PromotionCreate) -> DomainResult<Promotion> {
        let local_id = self.local.current_local_id();
        validate_name("name", &payload.name)?;
        validate_strategy(&payload.strategy)?;
        let criteria = payload.criteria.unwrap_or_default();
        validate_criteria(&criteria)?;
        if self
            .promotions
            .exists_by_name_and_local(&payload.name, local_id)
            .await?
        {
            return Err(DomainError::conflicting_name("promotion", payload.name));
        }

        let promotion = Promotion {
            id: new_id(),
            local_id,
            name: payload.name.trim().to_string(),
            description: payload.description,
            priority: payload.priority.unwrap_or(0),
            state: PromotionState::Active,
            strategy: payload.strategy,
            criteria,
            scope: Vec::new(),
        };
        let saved = self.promotions.save(promotion).await?;
        tracing::info!(promotion = %saved.name, priority = saved.priority, "promotion created");
        Ok(saved)
    }

    pub async fn update(&self, id: Uuid, payload: PromotionUpdate) -> DomainResult<Promotion> {
        let local_id = self.local.current_local_id();
        let mut promotion = self
            .promotions
            .find_by_id_and_local(id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("promotion", id))?;

        if let Some(name) = payload.name {
            validate_name("name", &name)?;
            let renamed = name.trim().to_lowercase() != promotion.name.trim().to_lowercase();
            if renamed
                && self
                    .promotions
                    .exists_by_name_and_local(&name, local_id)
                    .await?
            {
                return Err(DomainError::conflicting_name("promotion", name));
            }
            promotion.name = name.trim().to_string();
        }
        if let Some(description) = payload.description {
            promotion.description = Some(description);
        }
        if let Some(priority) = payload.priority {
            promotion.priority = priority;
        }
        if let Some(state) = payload.state {
            promotion.state = state;
        }
        if let Some(strategy) = payload.strategy {
            validate_strategy(&strategy)?;
            promotion.strategy = strategy;
        }
        if let Some(criteria) = payload.criteria {
            validate_criteria(&criteria)?;
            promotion.criteria = criteria;
        }

        Ok(self.promotions.save(promotion).await?)
    }

    pub async fn list(&self) -> DomainResult<Vec<Promotion>> {
        let local_id = self.local.current_local_id();
        Ok(self.promotions.list_by_local(local_id).await?)
    }

    /// Replace a promotion's scope. Reference ids must be unique, at least
    /// one TARGET is required, and TRIGGER entries only make sense for the
    /// combo strategy (which in turn requires one).
    pub async fn set_scope(&self, id: Uuid, scope: Vec<ScopeItem>) -> DomainResult<Promotion> {
        let local_id = self.local.current_local_id();
        let mut promotion = self
            .promotions
            .find_by_id_and_local(id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("promotion", id))?;

        let mut seen: HashSet<Uuid> = HashSet::new();
        for item in &scope {
            if !seen.insert(item.reference_id) {
                return Err(DomainError::validation(
                    "scope",
                    "duplicate reference in scope",
                ));
            }
            match item.reference_kind {
                ReferenceKind::Product => {
                    self.products
                        .find_by_id_and_local(item.reference_id, local_id)
                        .await?
                        .ok_or_else(|| DomainError::not_found("product", item.reference_id))?;
                }
                ReferenceKind::Category => {
                    self.categories
                        .find_by_id(item.reference_id, local_id)
                        .await?
                        .ok_or_else(|| DomainError::not_found("category", item.reference_id))?;
                }
            }
        }

        if !scope.iter().any(|s| s.role == ScopeRole::Target) {
            return Err(DomainError::validation(
                "scope",
                "at least one TARGET is required",
            ));
        }

        let has_trigger = scope.iter().any(|s| s.role == ScopeRole::Trigger);
        let is_combo = matches!(promotion.strategy, Strategy::ComboConditional { .. });
        if is_combo && !has_trigger {
            return Err(DomainError::validation(
                "scope",
                "combo promotions require a TRIGGER",
            ));
        }
        if !is_combo && has_trigger {
            return Err(DomainError::validation(
                "scope",
                "only combo promotions use TRIGGER entries",
            ));
        }

        promotion.scope = scope;
        Ok(self.promotions.save(promotion).await?)
    }
}
