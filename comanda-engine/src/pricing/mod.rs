//! Promotion rule engine
//!
//! Evaluation, conflict resolution, and application of automatic discounts,
//! at add-time for the incoming line and on full recomputation after
//! quantity changes and removals.
//!
//! - **context**: evaluation context built fresh per operation
//! - **matcher**: scope membership, activation criteria, combo triggers
//! - **calculator**: per-strategy discount amounts and cycle sizes
//! - **engine**: add-time path and bulk recomputation with cent-exact
//!   proportional distribution

pub mod calculator;
pub mod context;
pub mod engine;
pub mod matcher;

pub use context::EvaluationContext;
pub use engine::{ActivePromotion, build_active, evaluate_line, recompute_order};
pub use matcher::ScopeIndex;
