//! Stock ledger
//!
//! Per-product inventory tracking with an append-only movement trail.

pub mod ledger;

pub use ledger::LedgerOutcome;
