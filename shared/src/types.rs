//! Common types for the shared crate

use uuid::Uuid;

/// Tenant identifier. Every entity belongs to exactly one local and every
/// repository operation is scoped by it.
pub type LocalId = Uuid;
