pub mod contracts;
pub mod payments;
pub mod traceability;

use crate::error::ApiError;

/// Required-field check matching the service contract: absent or empty
/// values are rejected before any persistence work happens.
pub(crate) fn required_field(value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::bad_request("Missing required fields")),
    }
}

/// Monetary amounts must be present, finite, and non-negative. Zero is a
/// valid agreed price.
pub(crate) fn required_amount(value: Option<f64>, field: &str) -> Result<f64, ApiError> {
    match value {
        Some(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        Some(_) => Err(ApiError::bad_request(format!(
            "{} must be a non-negative number",
            field
        ))),
        None => Err(ApiError::bad_request("Missing required fields")),
    }
}
