//! Cash Movement Model

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cash movement kind enum (EGRESS only; reserved for extension)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashMovementKind {
    Egress,
}

/// Cash movement entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: Uuid,
    pub local_id: Uuid,
    /// Always > 0
    pub amount: Decimal,
    pub description: String,
    pub at: NaiveDateTime,
    pub kind: CashMovementKind,
    /// Unique per local, sequential with a textual prefix
    pub receipt_number: String,
}

/// Register cash movement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovementCreate {
    pub amount: Decimal,
    pub description: String,
}
