//! Order Model
//!
//! An order exclusively owns its items and extra lines. Item name and unit
//! price are captured at add-time and never re-read from the catalog, so
//! deleting a product cannot orphan historical lines.

use super::promotion::DiscountMode;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order state enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    #[default]
    Open,
    Closed,
}

/// Payment medium enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMedium {
    Cash,
    Card,
    Transfer,
    Qr,
    /// Internal consumption, excluded from real sales
    OnAccount,
}

/// Payment record, inserted at order close
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub medium: PaymentMedium,
    /// Always > 0
    pub amount: Decimal,
    pub paid_at: NaiveDateTime,
}

/// Manual discount granted by an operator, at line or order level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualDiscount {
    pub mode: DiscountMode,
    /// > 0; for PERCENT, within (0, 100]
    pub value: Decimal,
    pub reason: String,
    pub user_id: Uuid,
    pub applied_at: NaiveDateTime,
}

/// Extra line (value object), captured at add-time, immutable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtraLine {
    pub product_id: Uuid,
    pub name: String,
    /// Per-unit price, >= 0
    pub price: Decimal,
}

/// Winning automatic discount captured on an item
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromotionSnapshot {
    /// >= 0; zero when no promotion applies
    pub discount_amount: Decimal,
    pub promotion_id: Option<Uuid>,
    pub promotion_name: Option<String>,
}

impl PromotionSnapshot {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.promotion_id.is_none() && self.discount_amount.is_zero()
    }
}

/// One line of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Name snapshot, immutable once set
    pub product_name: String,
    /// Always >= 1
    pub quantity: u32,
    /// Unit price snapshot, immutable once set
    pub unit_price: Decimal,
    /// Free text, e.g. "sin cebolla"
    pub observation: Option<String>,
    pub extras: Vec<ExtraLine>,
    pub promotion: PromotionSnapshot,
    pub line_discount: Option<ManualDiscount>,
}

impl OrderItem {
    pub fn has_extras(&self) -> bool {
        !self.extras.is_empty()
    }
}

/// Frozen accounting snapshot, populated only while the order is CLOSED
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub final_total: Decimal,
}

/// Order entity (aggregate root)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub local_id: Uuid,
    pub table_id: Uuid,
    /// Sequential per local, monotonic
    pub number: i64,
    pub state: OrderState,
    pub opened_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
    pub items: Vec<OrderItem>,
    /// Empty until close
    pub payments: Vec<Payment>,
    pub global_discount: Option<ManualDiscount>,
    /// Accounting snapshot, `Some` iff state is CLOSED
    pub totals: Option<OrderTotals>,
}

impl Order {
    /// Fresh OPEN order on a table
    pub fn open(
        id: Uuid,
        local_id: Uuid,
        table_id: Uuid,
        number: i64,
        opened_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            local_id,
            table_id,
            number,
            state: OrderState::Open,
            opened_at,
            closed_at: None,
            items: Vec::new(),
            payments: Vec::new(),
            global_discount: None,
            totals: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == OrderState::Open
    }

    pub fn item(&self, item_id: Uuid) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: Uuid) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}
