//! Promotion Model
//!
//! A promotion is an aggregate root owning its scope and activation
//! criteria. Strategy and criteria are tagged sums with an explicit `kind`
//! discriminator; criteria persist as a JSON array, strategy fields flatten
//! onto the promotion row.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Promotion state enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionState {
    Active,
    Inactive,
}

/// Discount value interpretation, shared with manual discounts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountMode {
    Percent,
    FixedAmount,
}

/// Pricing strategy (tagged variant)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Unconditional discount on every targeted unit
    DirectDiscount { mode: DiscountMode, value: Decimal },
    /// Take `take` units, pay `pay` (`pay < take`)
    QuantityBundle { take: u32, pay: u32 },
    /// Percentage benefit gated on a trigger product being present
    ComboConditional {
        min_trigger_qty: u32,
        benefit_pct: Decimal,
    },
    /// Every complete pack of `activate_at` units costs `pack_price`
    FixedPricePack {
        activate_at: u32,
        pack_price: Decimal,
    },
}

/// Activation criterion (tagged variant, AND-composed)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationCriterion {
    /// Date range with optional weekday set and hour range
    Temporal {
        start_date: NaiveDate,
        end_date: NaiveDate,
        /// Active days of week (0 = Sunday .. 6 = Saturday)
        weekdays: Option<Vec<u8>>,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    },
    /// All listed products must be present in the current order
    Content { product_ids: Vec<Uuid> },
    /// Current order subtotal must reach the threshold
    MinAmount { threshold: Decimal },
}

/// What a scope item references
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceKind {
    Product,
    Category,
}

/// Role of a scope item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeRole {
    /// Receives the discount
    Target,
    /// Gates the combo strategy
    Trigger,
}

/// One entry of a promotion's scope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScopeItem {
    pub reference_id: Uuid,
    pub reference_kind: ReferenceKind,
    pub role: ScopeRole,
}

/// Promotion entity (aggregate root)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: Uuid,
    pub local_id: Uuid,
    /// Unique per local
    pub name: String,
    pub description: Option<String>,
    /// Higher wins when several promotions are eligible
    pub priority: u32,
    pub state: PromotionState,
    pub strategy: Strategy,
    /// AND-combined activation criteria
    pub criteria: Vec<ActivationCriterion>,
    pub scope: Vec<ScopeItem>,
}

impl Promotion {
    /// Scope items with the given role
    pub fn scope_with_role(&self, role: ScopeRole) -> impl Iterator<Item = &ScopeItem> {
        self.scope.iter().filter(move |s| s.role == role)
    }

    pub fn has_target(&self) -> bool {
        self.scope_with_role(ScopeRole::Target).next().is_some()
    }
}

/// Create promotion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCreate {
    pub name: String,
    pub description: Option<String>,
    pub priority: Option<u32>,
    pub strategy: Strategy,
    pub criteria: Option<Vec<ActivationCriterion>>,
}

/// Update promotion payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<u32>,
    pub state: Option<PromotionState>,
    pub strategy: Option<Strategy>,
    pub criteria: Option<Vec<ActivationCriterion>>,
}
