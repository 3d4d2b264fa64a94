//! Dining Table Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Table occupancy state, maintained by the order lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableState {
    #[default]
    Free,
    Open,
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: Uuid,
    pub local_id: Uuid,
    pub name: String,
    /// Unique per local
    pub number: i32,
    pub state: TableState,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub name: String,
    pub number: i32,
}
