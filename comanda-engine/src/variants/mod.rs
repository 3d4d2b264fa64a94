//! Variant normalization
//!
//! When structural modifiers arrive as extras, the selected product is
//! upgraded to the sibling variant whose structural size absorbs them.

pub mod normalizer;

pub use normalizer::{NormalizeError, Normalization, normalize};
