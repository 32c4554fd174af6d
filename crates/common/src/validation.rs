//! Input validation helpers for configuration and collaborator input
//!
//! Configuration is checked once, eagerly, so that analysis itself never has
//! to fail. These helpers return descriptive errors naming the offending field.

use anyhow::{anyhow, Result};

// ============================================================================
// Numeric Validation
// ============================================================================

/// Reject NaN and infinities
pub fn validate_finite(value: f64, field_name: &str) -> Result<()> {
    if !value.is_finite() {
        return Err(anyhow!("{} must be a finite number, got {}", field_name, value));
    }
    Ok(())
}

/// Validate value is finite and strictly greater than `min`
pub fn validate_greater_than(value: f64, min: f64, field_name: &str) -> Result<()> {
    validate_finite(value, field_name)?;
    if value <= min {
        return Err(anyhow!(
            "{} must be greater than {}, got {}",
            field_name,
            min,
            value
        ));
    }
    Ok(())
}

/// Validate value is finite and strictly positive
pub fn validate_positive(value: f64, field_name: &str) -> Result<()> {
    validate_greater_than(value, 0.0, field_name)
}

/// Validate value is within range
pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: T,
    max: T,
    field_name: &str,
) -> Result<()> {
    // written as a negated containment check so NaN is rejected too
    if !(value >= min && value <= max) {
        return Err(anyhow!(
            "{} must be between {} and {}, got {}",
            field_name,
            min,
            max,
            value
        ));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
