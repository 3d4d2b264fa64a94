//! Stock Movement Model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock movement kind enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementKind {
    Sale,
    ReopenOrder,
    ManualAdjustment,
    GoodsReceipt,
}

/// Stock movement entity (append-only audit trail)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub local_id: Uuid,
    /// Non-zero; negative = outflow
    pub quantity: i64,
    pub kind: StockMovementKind,
    pub at: NaiveDateTime,
    pub reason: Option<String>,
}
