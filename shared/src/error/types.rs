//! Error types and API response structures

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named failure kinds produced by the engine.
///
/// Each variant carries the data the transport layer needs to build a
/// response body; the HTTP status mapping lives in [`super::http`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Malformed input: out-of-range numbers, unknown enumeration values,
    /// invalid hex color, non-positive price, and the like.
    #[error("validation failed on '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// Mutation attempted on a CLOSED order.
    #[error("order is closed and cannot be modified")]
    OrderImmutable,

    /// Payments do not sum to the order's final total.
    #[error("payments sum to {given} but final total is {expected}")]
    PaymentMismatch { expected: Decimal, given: Decimal },

    /// A structural modifier was added where no variant upgrade exists.
    #[error("structural extra not allowed on '{0}'")]
    StructuralExtraNotAllowed(String),

    /// Day close blocked while tables are open.
    #[error("{0} table(s) still open")]
    TablesStillOpen(u32),

    /// A cash journal already exists for the operative date.
    #[error("operative day {0} is already closed")]
    DayAlreadyClosed(NaiveDate),

    /// Missing entity, scoped by the current local.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Unique-name-per-local constraint violated.
    #[error("{kind} name already in use: '{name}'")]
    ConflictingName { kind: String, name: String },

    /// Transaction aborted or deadline exceeded; the caller may retry.
    #[error("transaction aborted, retry may succeed")]
    Transient,

    /// Anything else; carries the cause for diagnostics.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error for a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not found error for an entity kind and id
    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }

    /// Create a conflicting name error for an entity kind
    pub fn conflicting_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ConflictingName {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an internal error
    pub fn internal(cause: impl Into<String>) -> Self {
        Self::Internal(cause.into())
    }

    /// Stable machine-readable name of the failure kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::OrderImmutable => "ORDER_IMMUTABLE",
            Self::PaymentMismatch { .. } => "PAYMENT_MISMATCH",
            Self::StructuralExtraNotAllowed(_) => "STRUCTURAL_EXTRA_NOT_ALLOWED",
            Self::TablesStillOpen(_) => "TABLES_STILL_OPEN",
            Self::DayAlreadyClosed(_) => "DAY_ALREADY_CLOSED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ConflictingName { .. } => "CONFLICTING_NAME",
            Self::Transient => "TRANSIENT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

/// Result type for engine operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Serialized error body inside an [`ApiResponse`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable failure kind
    pub kind: String,
    /// Human-readable message
    pub message: String,
    /// HTTP status the boundary should answer with
    pub status: u16,
}

/// Unified API response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    /// Wrap a successful payload
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Wrap an engine error
    pub fn error(err: &DomainError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                kind: err.kind_name().to_string(),
                message: err.to_string(),
                status: err.http_status().as_u16(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_stable() {
        let err = DomainError::validation("price", "must be positive");
        assert_eq!(err.kind_name(), "VALIDATION_FAILED");
        assert_eq!(DomainError::OrderImmutable.kind_name(), "ORDER_IMMUTABLE");
        assert_eq!(DomainError::Transient.kind_name(), "TRANSIENT");
    }

    #[test]
    fn test_error_response_carries_status() {
        let err = DomainError::not_found("product", "p-1");
        let resp = ApiResponse::<()>::error(&err);
        assert!(!resp.success);
        let body = resp.error.unwrap();
        assert_eq!(body.kind, "NOT_FOUND");
        assert_eq!(body.status, 404);
    }
}
