//! Order aggregate
//!
//! The state machine of a table's order: items, extras, discounts, merges,
//! removals, and the frozen accounting snapshot at close. Totals are always
//! computed bottom-up from line snapshots, never assigned top-down.

pub mod aggregate;
pub mod ticket;
pub mod totals;

pub use aggregate::AddOutcome;
pub use ticket::{CustomerReceipt, KitchenSlip};
pub use totals::ComputedTotals;
