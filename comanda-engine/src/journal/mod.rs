//! Cash journal closing
//!
//! Operative-date derivation with the night-shift cutoff and the
//! aggregation of a day's payments and egresses.

pub mod closer;

pub use closer::{JournalAggregates, aggregate_window, operative_date, operative_window};
