//! # Engine Error Types
//!
//! What callers of [`RateEngine`](crate::RateEngine) see when an operation
//! fails, plus configuration errors.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError ──► RateError ──┐                                      │
//! │                                  ├──► EngineError ──► ErrorPayload      │
//! │  sqlx::Error ──────► DbError ────┘        │             { code,         │
//! │                                           │               message }     │
//! │                                           ▼                             │
//! │                                     code() → ErrorCode                  │
//! │                                                                         │
//! │  RateError::NoMatchingRate / RateNotFound  → NOT_FOUND                  │
//! │  RateError::Validation                     → VALIDATION_ERROR           │
//! │  RateError::Conflict                       → CONFLICT                   │
//! │  RateError::NoChanges                      → NOT_APPLICABLE             │
//! │  DbError::*                                → DATABASE_ERROR             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use waybill_core::{RateError, ValidationError};
use waybill_db::DbError;

// =============================================================================
// Engine Error
// =============================================================================

/// Engine operation errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An expected, domain-level failure.
    #[error(transparent)]
    Rate(#[from] RateError),

    /// A storage fault, propagated unchanged.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Rate(RateError::Validation(err))
    }
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// No applicable rate, or unknown rate id (404)
    NotFound,

    /// Malformed input or unknown reference (400)
    ValidationError,

    /// Range overlaps an active rate of the same pair (409)
    Conflict,

    /// Request has nothing to apply (422)
    NotApplicable,

    /// Storage failed (500)
    DatabaseError,
}

/// Serializable error shape for a surrounding service layer.
///
/// ```json
/// { "code": "CONFLICT", "message": "Rate range conflicts with existing rate 7" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Rate(err) => match err {
                RateError::NoMatchingRate { .. } | RateError::RateNotFound(_) => {
                    ErrorCode::NotFound
                }
                RateError::Validation(_) => ErrorCode::ValidationError,
                RateError::Conflict { .. } => ErrorCode::Conflict,
                RateError::NoChanges => ErrorCode::NotApplicable,
            },
            EngineError::Storage(_) => ErrorCode::DatabaseError,
        }
    }

    /// Builds the payload, hiding storage details behind a generic message.
    pub fn to_payload(&self) -> ErrorPayload {
        let message = match self {
            EngineError::Rate(err) => err.to_string(),
            EngineError::Storage(err) => {
                tracing::error!(error = %err, "Database operation failed");
                "Database operation failed".to_string()
            }
        };

        ErrorPayload {
            code: self.code(),
            message,
        }
    }

    /// The domain error, if this is not a storage fault.
    pub fn as_rate_error(&self) -> Option<&RateError> {
        match self {
            EngineError::Rate(err) => Some(err),
            EngineError::Storage(_) => None,
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_core::ConflictSource;

    #[test]
    fn test_codes() {
        let cases = [
            (
                EngineError::from(RateError::NoMatchingRate {
                    method_id: 1,
                    zone_id: 2,
                    weight: 0,
                    total: 0,
                }),
                ErrorCode::NotFound,
            ),
            (EngineError::from(RateError::RateNotFound(3)), ErrorCode::NotFound),
            (
                EngineError::from(ValidationError::negative("rate")),
                ErrorCode::ValidationError,
            ),
            (
                EngineError::from(RateError::Conflict {
                    index: None,
                    with: ConflictSource::ExistingRate { rate_id: 1 },
                }),
                ErrorCode::Conflict,
            ),
            (EngineError::from(RateError::NoChanges), ErrorCode::NotApplicable),
            (
                EngineError::from(DbError::PoolExhausted),
                ErrorCode::DatabaseError,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(err.code(), code, "{err}");
        }
    }

    #[test]
    fn test_payload_serialization() {
        let payload = EngineError::from(RateError::RateNotFound(9)).to_payload();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Shipping rate not found: 9");

        let storage = EngineError::from(DbError::QueryFailed("disk I/O error".into())).to_payload();
        assert_eq!(storage.code, ErrorCode::DatabaseError);
        assert!(!storage.message.contains("disk"));
    }
}
