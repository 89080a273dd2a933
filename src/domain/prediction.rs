// ============================================================
// Layer 3 — Prediction Result
// ============================================================
// What the form shows once the network has produced a price,
// plus the entry recorded in the in-memory session history.

use serde::{Deserialize, Serialize};

/// One completed prediction as kept in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local wall-clock time, `HH:MM:SS`
    pub time: String,

    /// Predicted price
    pub price: f64,

    /// Short description of the listing (area and age)
    pub description: String,
}

impl HistoryEntry {
    pub fn new(time: impl Into<String>, price: f64, description: impl Into<String>) -> Self {
        Self {
            time:        time.into(),
            price,
            description: description.into(),
        }
    }
}

/// Render a price as `$ 1,234,567.89`.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("$ {sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separators() {
        assert_eq!(format_currency(1234567.891), "$ 1,234,567.89");
        assert_eq!(format_currency(999.5), "$ 999.50");
        assert_eq!(format_currency(0.0), "$ 0.00");
    }

    #[test]
    fn test_negative_values_keep_sign() {
        assert_eq!(format_currency(-1500.0), "$ -1,500.00");
        assert_eq!(format_currency(-0.001), "$ 0.00");
    }
}
