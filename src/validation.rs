//! # Validation Rule Sets
//!
//! One generic rule-collecting engine shared by every resource handler.
//! Checks run before any persistence call and are all-or-nothing: every
//! violated field is collected and reported together, one message per field.

use chrono::{DateTime, NaiveDate};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// A single violated field, serialized as a single-key object
/// `{"field": "message"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.message)?;
        map.end()
    }
}

/// Collects violations across a payload. Build with the chainable rule
/// methods, then call [`RuleSet::finish`].
#[derive(Debug, Default)]
pub struct RuleSet {
    errors: Vec<FieldError>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The field must be present and non-empty.
    pub fn required(mut self, field: &str, value: &Option<String>, message: &str) -> Self {
        match value {
            Some(text) if !text.is_empty() => {}
            _ => self.errors.push(FieldError::new(field, message)),
        }
        self
    }

    /// The field, when present, must parse as a calendar date. An empty
    /// string is present and fails the check.
    pub fn optional_date(mut self, field: &str, value: &Option<String>, message: &str) -> Self {
        if let Some(text) = value {
            if parse_date(text).is_none() {
                self.errors.push(FieldError::new(field, message));
            }
        }
        self
    }

    /// The field must be present, numeric, and within `[min, max]`.
    ///
    /// Accepts JSON numbers as well as numeric strings (form bodies arrive
    /// as text).
    pub fn numeric_range(
        mut self,
        field: &str,
        value: &Option<Value>,
        min: f64,
        max: f64,
        message: &str,
    ) -> Self {
        match value.as_ref().and_then(as_f64) {
            Some(number) if number >= min && number <= max => {}
            _ => self.errors.push(FieldError::new(field, message)),
        }
        self
    }

    /// Succeed when nothing was violated, otherwise report the whole set.
    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Parse an ISO calendar date, either plain (`2024-03-01`) or the date part
/// of an RFC 3339 timestamp.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|t| t.date_naive()))
}

/// Numeric view of a loosely typed JSON value.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_error_serializes_as_single_key_object() {
        let error = FieldError::new("longitude", "Longitude must be a valid number");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json, json!({"longitude": "Longitude must be a valid number"}));
    }

    #[test]
    fn test_required_rejects_missing_and_empty() {
        let result = RuleSet::new()
            .required("batch_number", &None, "Batch number is required")
            .required("product_name", &Some(String::new()), "Product name is required")
            .finish();

        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "batch_number");
        assert_eq!(errors[1].field, "product_name");
    }

    #[test]
    fn test_all_violations_are_reported_together() {
        let result = RuleSet::new()
            .required("batch_number", &None, "Batch number is required")
            .numeric_range("latitude", &None, -90.0, 90.0, "Latitude must be a valid number")
            .numeric_range(
                "longitude",
                &Some(json!(200)),
                -180.0,
                180.0,
                "Longitude must be a valid number",
            )
            .finish();

        let errors = result.unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["batch_number", "latitude", "longitude"]);
    }

    #[test]
    fn test_optional_date_accepts_absent_and_valid() {
        let result = RuleSet::new()
            .optional_date("manufacture_date", &None, "bad date")
            .optional_date("expiry_date", &Some("2024-03-01".to_string()), "bad date")
            .finish();
        assert!(result.is_ok());
    }

    #[test]
    fn test_optional_date_rejects_empty_string() {
        // An empty date is supplied-but-invalid, not absent.
        let result = RuleSet::new()
            .optional_date("manufacture_date", &Some(String::new()), "bad date")
            .finish();
        assert_eq!(result.unwrap_err()[0].field, "manufacture_date");
    }

    #[test]
    fn test_optional_date_rejects_garbage() {
        let result = RuleSet::new()
            .optional_date("expiry_date", &Some("not-a-date".to_string()), "bad date")
            .finish();
        assert_eq!(result.unwrap_err()[0].field, "expiry_date");
    }

    #[test]
    fn test_numeric_range_accepts_numeric_strings() {
        let result = RuleSet::new()
            .numeric_range("latitude", &Some(json!("45.5")), -90.0, 90.0, "bad latitude")
            .finish();
        assert!(result.is_ok());
    }

    #[test]
    fn test_numeric_range_rejects_boundary_overflow() {
        let result = RuleSet::new()
            .numeric_range("latitude", &Some(json!(90.0001)), -90.0, 90.0, "bad latitude")
            .finish();
        assert_eq!(result.unwrap_err()[0].field, "latitude");
    }

    #[test]
    fn test_parse_date_handles_rfc3339() {
        assert!(parse_date("2024-03-01").is_some());
        assert!(parse_date("2024-03-01T10:30:00Z").is_some());
        assert!(parse_date("03/01/2024").is_none());
    }
}
