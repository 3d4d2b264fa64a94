//! Shared types for the comanda service
//!
//! Domain models, the error taxonomy, and small utilities used by the
//! order-and-pricing engine and by any transport crate layered on top.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Unified error system re-exports
pub use error::{ApiResponse, DomainError, DomainResult};
