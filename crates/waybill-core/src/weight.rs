//! Weight units.
//!
//! The catalog stores weights as whole grams. Callers that think in
//! kilograms convert once at the edge.

use crate::error::ValidationError;
use crate::validation::ValidationResult;

pub const GRAMS_PER_KILOGRAM: i64 = 1000;

/// Converts kilograms to grams, rounding half away from zero.
///
/// ```rust
/// use waybill_core::weight::grams_from_kilograms;
///
/// assert_eq!(grams_from_kilograms(2.5).unwrap(), 2500);
/// assert_eq!(grams_from_kilograms(0.0004).unwrap(), 0);
/// assert!(grams_from_kilograms(-1.0).is_err());
/// ```
pub fn grams_from_kilograms(kilograms: f64) -> ValidationResult<i64> {
    if !kilograms.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "weight".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    if kilograms < 0.0 {
        return Err(ValidationError::negative("weight"));
    }

    let grams = (kilograms * GRAMS_PER_KILOGRAM as f64).round();
    // i64::MAX as f64 rounds up to 2^63, which does not fit
    if grams >= i64::MAX as f64 {
        return Err(ValidationError::InvalidFormat {
            field: "weight".to_string(),
            reason: "too large".to_string(),
        });
    }
    Ok(grams as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_nearest_gram() {
        assert_eq!(grams_from_kilograms(0.0).unwrap(), 0);
        assert_eq!(grams_from_kilograms(1.0).unwrap(), 1000);
        assert_eq!(grams_from_kilograms(1.2345).unwrap(), 1235);
        assert_eq!(grams_from_kilograms(0.0005).unwrap(), 1);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            grams_from_kilograms(-0.5),
            Err(ValidationError::negative("weight"))
        );
        assert!(grams_from_kilograms(f64::NAN).is_err());
        assert!(grams_from_kilograms(f64::INFINITY).is_err());
        assert!(grams_from_kilograms(1e300).is_err());
    }

    #[test]
    fn test_two_to_the_63_is_too_large() {
        let kilograms = 9_223_372_036_854_775_808.0 / GRAMS_PER_KILOGRAM as f64;
        assert!(grams_from_kilograms(kilograms).is_err());
        assert!(grams_from_kilograms(9.0e15).is_ok());
    }
}
