//! Category Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub local_id: Uuid,
    /// Unique per local
    pub name: String,
    /// Display color, uppercase `#RRGGBB`
    pub color: String,
    pub admits_variants: bool,
    /// Products of this category are sold as extras
    pub is_extra_category: bool,
    pub sort_order: i32,
    /// Products of this category offer modifiers drawn only from the
    /// referenced category
    pub modifier_category_id: Option<Uuid>,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub color: Option<String>,
    pub admits_variants: Option<bool>,
    pub is_extra_category: Option<bool>,
    pub sort_order: Option<i32>,
    pub modifier_category_id: Option<Uuid>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub admits_variants: Option<bool>,
    pub is_extra_category: Option<bool>,
    pub sort_order: Option<i32>,
    pub modifier_category_id: Option<Uuid>,
}
