//! Error types for RiskHub Core
//!
//! Provides error handling for:
//! - Input validation (missing or out-of-range fields)
//! - Aggregate invariant violations (bobot totals)
//! - Row (de)serialization against the row store shape

use std::fmt;

/// Main domain error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An aggregate invariant would be violated by the write
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantError),

    /// Row could not be converted to or from a record
    #[error("row conversion failed: {0}")]
    RowConversion(#[from] serde_json::Error),

    /// Row was not a JSON object
    #[error("row is not an object")]
    NotAnObject,
}

impl CoreError {
    /// Check if error was caused by the caller's input
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Invariant(_))
    }
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    /// Field name as it appears in the request body
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

/// Validation failure carrying every rejected field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    /// Rejected fields in declaration order
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// Create an error for a single field
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// Whether any field was rejected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the given field was rejected
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, e) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{} {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Aggregate invariant violations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantError {
    /// Bobot total for a SWOT category would exceed the allowed total
    #[error("bobot for {kategori} would total {total}, maximum is {max}")]
    BobotExceeded {
        /// SWOT category
        kategori: String,
        /// Resulting total
        total: u32,
        /// Allowed total
        max: u32,
    },

    /// Bobot total for a bulk replacement is not exact
    #[error("bobot for {kategori} totals {total}, expected exactly {expected}")]
    BobotNotExact {
        /// SWOT category
        kategori: String,
        /// Supplied total
        total: u32,
        /// Required total
        expected: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_lists_fields() {
        let err = ValidationError {
            fields: vec![
                FieldError {
                    field: "kode".into(),
                    message: "is required".into(),
                },
                FieldError {
                    field: "rank".into(),
                    message: "must be between 1 and 5".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "validation failed: kode is required; rank must be between 1 and 5"
        );
    }

    #[test]
    fn client_errors_are_classified() {
        let v = CoreError::from(ValidationError::single("x", "bad"));
        assert!(v.is_client_error());
        assert!(!CoreError::NotAnObject.is_client_error());
    }
}
