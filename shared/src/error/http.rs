//! HTTP status code mapping for the failure kinds

use super::types::DomainError;
use http::StatusCode;

impl DomainError {
    /// Get the appropriate HTTP status code for this failure kind
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::ValidationFailed { .. }
            | Self::PaymentMismatch { .. }
            | Self::StructuralExtraNotAllowed(_)
            | Self::TablesStillOpen(_) => StatusCode::BAD_REQUEST,

            // 409 Conflict
            Self::OrderImmutable | Self::DayAlreadyClosed(_) | Self::ConflictingName { .. } => {
                StatusCode::CONFLICT
            }

            // 404 Not Found
            Self::NotFound { .. } => StatusCode::NOT_FOUND,

            // 503 Service Unavailable (client can retry)
            Self::Transient => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            DomainError::validation("color", "not a hex color").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::PaymentMismatch {
                expected: Decimal::new(1000, 2),
                given: Decimal::new(900, 2),
            }
            .http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::TablesStillOpen(3).http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            DomainError::OrderImmutable.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DomainError::conflicting_name("product", "Cerveza").http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            DomainError::not_found("order", "o-1").http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_transient_and_internal_status() {
        assert_eq!(
            DomainError::Transient.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            DomainError::internal("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
