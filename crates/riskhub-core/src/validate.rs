//! Request validation and row conversion helpers
//!
//! Drafts (request bodies) keep every field optional so that a missing field
//! is reported by name instead of failing JSON decoding as a whole.

use crate::error::{CoreError, FieldError, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

/// A JSON object as exchanged with the row store
pub type Row = Map<String, Value>;

/// Implemented by every request draft
pub trait Validate {
    /// Check required fields and ranges
    ///
    /// # Errors
    /// Returns every rejected field at once.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Accumulates field errors
#[derive(Debug, Default)]
pub struct Validator {
    fields: Vec<FieldError>,
}

impl Validator {
    /// Create empty validator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an arbitrary field error
    pub fn reject(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.fields.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
        self
    }

    /// Require presence of an optional value
    pub fn require<T>(&mut self, field: &str, value: Option<&T>) -> &mut Self {
        if value.is_none() {
            self.reject(field, "is required");
        }
        self
    }

    /// Require a non-blank string
    pub fn require_text(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value {
            None => {
                self.reject(field, "is required");
            }
            Some(s) if s.trim().is_empty() => {
                self.reject(field, "must not be blank");
            }
            Some(_) => {}
        }
        self
    }

    /// Check an optional integer lies in `min..=max`; absent values pass
    pub fn range(&mut self, field: &str, value: Option<i64>, min: i64, max: i64) -> &mut Self {
        if let Some(v) = value {
            if v < min || v > max {
                self.reject(field, format!("must be between {min} and {max}"));
            }
        }
        self
    }

    /// Finish validation
    ///
    /// # Errors
    /// Returns the accumulated field errors, if any.
    pub fn finish(&mut self) -> Result<(), ValidationError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                fields: std::mem::take(&mut self.fields),
            })
        }
    }
}

/// Serialize a record or draft into a row, dropping absent fields
///
/// # Errors
/// Fails if the value does not serialize to a JSON object.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, CoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(CoreError::NotAnObject),
    }
}

/// Decode a row into a typed record
///
/// # Errors
/// Fails if a required column is missing or has the wrong type.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, CoreError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Decode all rows, stopping at the first failure
///
/// # Errors
/// See [`from_row`].
pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, CoreError> {
    rows.into_iter().map(from_row).collect()
}

/// Number held as a JSON number or a numeric string
fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Accept integers stored as JSON numbers (including whole floats) or numeric strings
///
/// Legacy rows hold `bobot`/`rank` as numeric columns that PostgREST may
/// render as `12.0` or `"12"`.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match loose_number(&value) {
        Some(n) if n >= 0.0 && n <= f64::from(u32::MAX) => Ok(n.round() as u32),
        _ => Err(serde::de::Error::custom(format!(
            "expected non-negative number, got {value}"
        ))),
    }
}

/// Accept a whole number or a numeric string, such as a `tahun` of `"2025"`
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match loose_number(&value) {
        Some(n) if n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) => {
            Ok(n as i32)
        }
        _ => Err(serde::de::Error::custom(format!(
            "expected whole number, got {value}"
        ))),
    }
}

/// Optional number as stored, fractions kept; null reads as `None`
pub fn lenient_f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match loose_number(&value) {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(serde::de::Error::custom(format!(
            "expected number, got {value}"
        ))),
    }
}

/// Accept RFC 3339 timestamps as well as offset-less ones (read as UTC)
///
/// `timestamp without time zone` columns come back as `2025-01-01T09:00:00`.
pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&text, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(dt) = DateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    Err(serde::de::Error::custom(format!("invalid timestamp: {text}")))
}
