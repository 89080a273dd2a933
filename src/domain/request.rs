// ============================================================
// Layer 3 — Prediction Request
// ============================================================
// The raw values of one listing, exactly as the user entered
// them: numbers for measurements, labels for categories.
// A request lives for a single prediction call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Numeric measurements keyed by column name
    pub numeric: BTreeMap<String, f64>,

    /// Selected label per categorical column
    pub categorical: BTreeMap<String, String>,
}

impl PredictionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numeric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.numeric.insert(name.into(), value);
        self
    }

    pub fn with_category(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.categorical.insert(name.into(), label.into());
        self
    }

    /// Value of a numeric field; absent fields count as zero.
    pub fn numeric_value(&self, name: &str) -> f64 {
        self.numeric.get(name).copied().unwrap_or(0.0)
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        self.categorical.get(name).map(String::as_str)
    }
}

/// Parse a numeric form entry. Blank input means zero.
pub fn parse_numeric(field: &str, raw: &str) -> Result<f64, EstimatorError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(EstimatorError::MalformedNumber {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_zero() {
        assert_eq!(parse_numeric("age", "   ").unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_text_and_infinity() {
        assert!(parse_numeric("age", "ten").is_err());
        assert!(parse_numeric("age", "inf").is_err());
        assert_eq!(parse_numeric("age", " 10.5 ").unwrap(), 10.5);
    }

    #[test]
    fn test_absent_numeric_defaults_to_zero() {
        let r = PredictionRequest::new().with_numeric("rooms", 6.0);
        assert_eq!(r.numeric_value("rooms"), 6.0);
        assert_eq!(r.numeric_value("bedrooms"), 0.0);
    }
}
