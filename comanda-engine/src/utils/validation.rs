//! Input validation helpers
//!
//! Field-level checks shared by the services. Anything that fails here
//! surfaces as `ValidationFailed` with the offending field name.

use rust_decimal::Decimal;
use shared::error::{DomainError, DomainResult};

/// Maximum length for entity names
pub const MAX_NAME_LEN: usize = 120;
/// Maximum length for free-text notes and observations
pub const MAX_NOTE_LEN: usize = 500;
/// Maximum length for discount reasons
pub const MAX_REASON_LEN: usize = 200;

/// Validate a required name: non-empty after trimming and within bounds
pub fn validate_name(field: &str, value: &str) -> DomainResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(DomainError::validation(
            field,
            format!("must not exceed {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(())
}

/// Validate optional free text against a length cap
pub fn validate_optional_text(
    field: &str,
    value: &Option<String>,
    max_len: usize,
) -> DomainResult<()> {
    if let Some(text) = value {
        if text.len() > max_len {
            return Err(DomainError::validation(
                field,
                format!("must not exceed {} characters", max_len),
            ));
        }
    }
    Ok(())
}

/// Validate a strictly positive monetary amount
pub fn validate_positive_amount(field: &str, value: Decimal) -> DomainResult<()> {
    if value <= Decimal::ZERO {
        return Err(DomainError::validation(field, "must be positive"));
    }
    Ok(())
}

/// Validate and normalize a `#RRGGBB` hex color to uppercase.
/// `None` yields the default white.
pub fn normalize_hex_color(field: &str, value: Option<String>) -> DomainResult<String> {
    let Some(raw) = value else {
        return Ok(shared::models::Product::DEFAULT_COLOR.to_string());
    };

    let trimmed = raw.trim();
    let valid = trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(DomainError::validation(
            field,
            format!("'{}' is not a valid #RRGGBB color", raw),
        ));
    }

    Ok(trimmed.to_ascii_uppercase())
}
