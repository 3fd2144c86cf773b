//! # Error Types
//!
//! Domain-specific error types for waybill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  waybill-core errors (this file)                                       │
//! │  ├── RateError        - Resolution, conflict and delta failures         │
//! │  └── ValidationError  - Malformed ranges, amounts, references          │
//! │                                                                         │
//! │  waybill-db errors (separate crate)                                    │
//! │  └── DbError          - Storage faults                                 │
//! │                                                                         │
//! │  waybill-engine errors                                                 │
//! │  └── EngineError      - What the service layer sees (with a code)      │
//! │                                                                         │
//! │  Flow: ValidationError → RateError → EngineError → service layer       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Rate Error
// =============================================================================

/// Where a conflicting range came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictSource {
    /// An active rate already stored in the catalog.
    ExistingRate { rate_id: i64 },
    /// An earlier accepted candidate of the same batch.
    Candidate { index: usize },
}

impl fmt::Display for ConflictSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictSource::ExistingRate { rate_id } => write!(f, "existing rate {}", rate_id),
            ConflictSource::Candidate { index } => write!(f, "candidate #{}", index),
        }
    }
}

/// Rate engine errors.
///
/// Every expected failure of a public operation is one of these variants.
/// Storage faults live in `DbError` and never pass through here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    /// No active rate covers the requested weight and total.
    ///
    /// ## When This Occurs
    /// - The method/zone pair has no active rates at all
    /// - The weight or total falls into a gap between brackets
    ///
    /// The engine never substitutes a default rate; the caller decides.
    #[error(
        "No active rate for method {method_id} in zone {zone_id} covers weight {weight}g and total {total}"
    )]
    NoMatchingRate {
        method_id: i64,
        zone_id: i64,
        weight: i64,
        total: i64,
    },

    /// A rate id that does not exist in the catalog.
    #[error("Shipping rate not found: {0}")]
    RateNotFound(i64),

    /// The range overlaps another active range of the same method and zone.
    #[error("Rate range conflicts with {with}")]
    Conflict {
        /// Position of the rejected candidate, when it came from a batch.
        index: Option<usize>,
        with: ConflictSource,
    },

    /// A bulk or single update carried no field changes.
    #[error("No changes requested")]
    NoChanges,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// An interval whose upper bound lies below its lower bound.
    #[error("{field} range is inverted: max {max} is below min {min}")]
    InvertedRange { field: String, min: i64, max: i64 },

    /// A referenced method or zone does not exist.
    #[error("{entity} {id} does not exist")]
    UnknownReference { entity: String, id: i64 },

    /// A list input that must not be empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Batch exceeds the configured size limit.
    #[error("Batch of {actual} exceeds the limit of {max}")]
    BatchTooLarge { max: usize, actual: usize },

    /// Value that cannot be represented (e.g. NaN kilograms).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Negative error for a field.
    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::Negative {
            field: field.into(),
        }
    }

    /// Creates an UnknownReference error.
    pub fn unknown(entity: impl Into<String>, id: i64) -> Self {
        ValidationError::UnknownReference {
            entity: entity.into(),
            id,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with RateError.
pub type RateResult<T> = Result<T, RateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RateError::NoMatchingRate {
            method_id: 1,
            zone_id: 2,
            weight: 9000,
            total: 100,
        };
        assert_eq!(
            err.to_string(),
            "No active rate for method 1 in zone 2 covers weight 9000g and total 100"
        );

        let err = RateError::Conflict {
            index: Some(3),
            with: ConflictSource::ExistingRate { rate_id: 7 },
        };
        assert_eq!(err.to_string(), "Rate range conflicts with existing rate 7");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::InvertedRange {
            field: "weight".to_string(),
            min: 500,
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "weight range is inverted: max 100 is below min 500"
        );
        assert_eq!(
            ValidationError::unknown("Shipping zone", 9).to_string(),
            "Shipping zone 9 does not exist"
        );
    }

    #[test]
    fn test_validation_converts_to_rate_error() {
        let rate_err: RateError = ValidationError::negative("rate").into();
        assert!(matches!(rate_err, RateError::Validation(_)));
    }

    #[test]
    fn test_validation_error_serializes_with_kind_tag() {
        let json = serde_json::to_value(ValidationError::negative("min_total")).unwrap();
        assert_eq!(json["kind"], "negative");
        assert_eq!(json["field"], "min_total");
    }
}
