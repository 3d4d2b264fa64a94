//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub local_id: Uuid,
    /// Unique per local, case-insensitive
    pub name: String,
    /// Unit price, always > 0
    pub price: Decimal,
    pub is_active: bool,
    /// Display color, uppercase `#RRGGBB`
    pub color: String,
    pub category_id: Option<Uuid>,
    /// Products sharing a group are size variants of each other
    pub variant_group_id: Option<Uuid>,
    /// Structural size of this variant (e.g. meat discs in a burger);
    /// higher means structurally larger. `None` outside variant groups.
    pub structural_modifier_count: Option<i32>,
    /// Sellable only as an extra line on another item
    pub is_extra: bool,
    /// Adding this product as an extra escalates the chosen variant
    pub is_structural_modifier: bool,
    /// Only products with `admits_extras` and not `is_extra` may receive extras
    pub admits_extras: bool,
    pub requires_configuration: bool,
    pub stock_tracked: bool,
    /// May be negative when tracking was activated retroactively
    pub current_stock: i64,
}

impl Product {
    /// Default display color for products created without one
    pub const DEFAULT_COLOR: &'static str = "#FFFFFF";
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub color: Option<String>,
    pub category_id: Option<Uuid>,
    pub variant_group_id: Option<Uuid>,
    pub structural_modifier_count: Option<i32>,
    pub is_extra: Option<bool>,
    pub is_structural_modifier: Option<bool>,
    pub admits_extras: Option<bool>,
    pub requires_configuration: Option<bool>,
    pub stock_tracked: Option<bool>,
    pub initial_stock: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub color: Option<String>,
    pub category_id: Option<Uuid>,
    pub variant_group_id: Option<Uuid>,
    pub structural_modifier_count: Option<i32>,
    pub is_extra: Option<bool>,
    pub is_structural_modifier: Option<bool>,
    pub admits_extras: Option<bool>,
    pub requires_configuration: Option<bool>,
}
