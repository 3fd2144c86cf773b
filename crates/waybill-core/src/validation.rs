//! # Validation Module
//!
//! Input validation for rate ranges, amounts and requests.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service layer (external)                                     │
//! │  └── Currency conversion, permission checks                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Non-negative bounds, amounts, weights                             │
//! │  └── max >= min on every bounded interval                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine (waybill-engine)                                      │
//! │  └── Method / zone existence, conflicts against the catalog            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── CHECK constraints                                                 │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::range::{Interval, RateRange};
use crate::types::{NewShippingRate, RateChanges};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that an amount (money or weight) is zero or greater.
///
/// ```rust
/// use waybill_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("rate", 0).is_ok());
/// assert!(validate_non_negative("rate", -1).is_err());
/// ```
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::negative(field));
    }
    Ok(())
}

/// Validates one interval: non-negative lower bound and `max >= min`.
pub fn validate_interval(field: &str, interval: &Interval) -> ValidationResult<()> {
    validate_non_negative(&format!("min_{}", field), interval.min)?;

    if let Some(max) = interval.max {
        if max < interval.min {
            return Err(ValidationError::InvertedRange {
                field: field.to_string(),
                min: interval.min,
                max,
            });
        }
    }

    Ok(())
}

/// Validates both dimensions of a rate range.
///
/// ```rust
/// use waybill_core::{validation::validate_range, Interval, RateRange};
///
/// let ok = RateRange::new(Interval::new(0, Some(5000)), Interval::at_least(0));
/// assert!(validate_range(&ok).is_ok());
///
/// let inverted = RateRange::new(Interval::new(5000, Some(10)), Interval::at_least(0));
/// assert!(validate_range(&inverted).is_err());
/// ```
pub fn validate_range(range: &RateRange) -> ValidationResult<()> {
    validate_interval("weight", &range.weight)?;
    validate_interval("total", &range.total)?;
    Ok(())
}

/// Validates the request side of a resolution: weight and total.
pub fn validate_query(weight: i64, total: i64) -> ValidationResult<()> {
    validate_non_negative("weight", weight)?;
    validate_non_negative("total", total)?;
    Ok(())
}

// =============================================================================
// Rate Validators
// =============================================================================

/// Validates everything about a candidate that does not need the catalog.
pub fn validate_new_rate(candidate: &NewShippingRate) -> ValidationResult<()> {
    validate_range(&candidate.range())?;
    validate_non_negative("rate", candidate.rate)?;
    if let Some(threshold) = candidate.free_threshold {
        validate_non_negative("free_threshold", threshold)?;
    }
    Ok(())
}

/// Validates the values carried by a delta. Emptiness is checked by callers.
pub fn validate_changes(changes: &RateChanges) -> ValidationResult<()> {
    if let Some(rate) = changes.rate {
        validate_non_negative("rate", rate)?;
    }
    if let Some(Some(threshold)) = changes.free_threshold {
        validate_non_negative("free_threshold", threshold)?;
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a batch: non-empty and within `max` rows.
pub fn validate_batch_size(field: &str, len: usize, max: usize) -> ValidationResult<()> {
    if len == 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if len > max {
        return Err(ValidationError::BatchTooLarge { max, actual: len });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(range: RateRange, rate: i64) -> NewShippingRate {
        NewShippingRate::new(1, 2, range, rate)
    }

    #[test]
    fn test_validate_interval() {
        assert!(validate_interval("weight", &Interval::new(0, Some(0))).is_ok());
        assert!(validate_interval("weight", &Interval::at_least(10)).is_ok());

        assert_eq!(
            validate_interval("weight", &Interval::new(-1, None)),
            Err(ValidationError::negative("min_weight"))
        );
        assert!(matches!(
            validate_interval("total", &Interval::new(100, Some(99))),
            Err(ValidationError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_validate_new_rate() {
        let range = RateRange::new(Interval::new(0, Some(5000)), Interval::new(0, Some(5000)));
        assert!(validate_new_rate(&candidate(range, 500)).is_ok());
        assert!(validate_new_rate(&candidate(range, 0)).is_ok());
        assert!(validate_new_rate(&candidate(range, -5)).is_err());
        assert!(validate_new_rate(&candidate(range, 500).with_free_threshold(-1)).is_err());

        let inverted = RateRange::new(Interval::new(0, Some(5000)), Interval::new(10, Some(5)));
        assert!(validate_new_rate(&candidate(inverted, 500)).is_err());
    }

    #[test]
    fn test_validate_changes() {
        assert!(validate_changes(&RateChanges::default().rate(0)).is_ok());
        assert!(validate_changes(&RateChanges::default().free_threshold(None)).is_ok());
        assert!(validate_changes(&RateChanges::default().rate(-1)).is_err());
        assert!(validate_changes(&RateChanges::default().free_threshold(Some(-1))).is_err());
    }

    #[test]
    fn test_validate_query() {
        assert!(validate_query(0, 0).is_ok());
        assert!(validate_query(-1, 0).is_err());
        assert!(validate_query(0, -1).is_err());
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(validate_batch_size("rates", 1, 10).is_ok());
        assert!(validate_batch_size("rates", 10, 10).is_ok());
        assert!(matches!(
            validate_batch_size("rates", 0, 10),
            Err(ValidationError::Required { .. })
        ));
        assert_eq!(
            validate_batch_size("rates", 11, 10),
            Err(ValidationError::BatchTooLarge { max: 10, actual: 11 })
        );
    }
}
