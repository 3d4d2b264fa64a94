//! Unified error system for the comanda service
//!
//! - [`DomainError`]: the named failure kinds produced by the engine
//! - [`ApiResponse`]: unified API response envelope for the HTTP boundary
//!
//! The engine never catches a [`DomainError`] to continue; every failure
//! propagates upward and the transport layer decides user-visible wording.
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiResponse, DomainError};
//!
//! let err = DomainError::validation("price", "must be positive");
//! assert_eq!(err.http_status().as_u16(), 400);
//!
//! let response = ApiResponse::<()>::error(&err);
//! ```

mod http;
mod types;

pub use types::{ApiResponse, DomainError, DomainResult, ErrorBody};
