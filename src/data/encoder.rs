// ============================================================
// Layer 4 — Encoding Scheme
// ============================================================
// The contract that must be identical between training and
// inference.
//
// Vocabulary:
//   For each categorical column, the sorted, deduplicated
//   labels seen in the training data. The FIRST label is the
//   reference category.
//
// One-hot with the reference dropped:
//   A column with k labels becomes k-1 indicator columns named
//   "{column}_{label}". The reference label is encoded as all
//   indicators zero, which avoids the linear dependency a full
//   one-hot set would introduce.
//
//   heating ∈ {electric, gas, hot air}
//     → heating_gas, heating_hot air   (electric = all zeros)
//
// Feature order:
//   numeric columns (table order), then each categorical
//   column's indicators (table order, label order). This is the
//   order of the network's input layer.
//
// Reconciliation:
//   A single record only "produces" the indicator for its own
//   label. `EncodedRecord::reconcile` projects it onto the full
//   feature order: absent features become 0, unexpected ones
//   are dropped. Training rows go through the same projection.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::data::schema::Schema;
use crate::domain::request::PredictionRequest;
use crate::domain::table::Table;
use crate::error::EstimatorError;

/// Name of the indicator column for `label` in `column`.
pub fn indicator_name(column: &str, label: &str) -> String {
    format!("{column}_{label}")
}

/// Ordered labels observed for one categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    pub column: String,
    /// Sorted and deduplicated; `labels[0]` is the reference
    pub labels: Vec<String>,
}

impl CategoryVocabulary {
    pub fn new(column: impl Into<String>, labels: impl IntoIterator<Item = String>) -> Self {
        let labels: BTreeSet<String> = labels.into_iter().collect();
        Self {
            column: column.into(),
            labels: labels.into_iter().collect(),
        }
    }

    /// The dropped label, encoded as all indicators zero.
    pub fn reference(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.binary_search_by(|l| l.as_str().cmp(label)).is_ok()
    }

    /// Indicator columns for this vocabulary: one per non-reference label.
    pub fn indicator_names(&self) -> Vec<String> {
        self.labels
            .iter()
            .skip(1)
            .map(|label| indicator_name(&self.column, label))
            .collect()
    }
}

/// A record after one-hot expansion: only the columns it produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedRecord {
    pub columns: Vec<(String, f64)>,
}

impl EncodedRecord {
    /// Project onto `feature_order`: missing features are zero,
    /// columns outside the order are discarded.
    pub fn reconcile(&self, feature_order: &[String]) -> Vec<f64> {
        let produced: HashMap<&str, f64> = self
            .columns
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();

        feature_order
            .iter()
            .map(|name| produced.get(name.as_str()).copied().unwrap_or(0.0))
            .collect()
    }
}

/// Vocabularies plus the numeric columns, i.e. everything
/// needed to turn a raw record into the network's input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingScheme {
    /// Name of the predicted column
    pub target:      String,
    /// Numeric feature columns in table order
    pub numeric:     Vec<String>,
    /// Categorical columns in table order
    pub categorical: Vec<CategoryVocabulary>,
}

impl EncodingScheme {
    /// Derive the scheme from the complete rows of `table`.
    pub fn fit(table: &Table, schema: &Schema) -> Self {
        let numeric = schema.numeric().map(|c| c.name.clone()).collect();

        let categorical = schema
            .categorical()
            .map(|col| {
                let labels = table
                    .complete_rows()
                    .map(|row| row[col.index].to_string());
                CategoryVocabulary::new(col.name.clone(), labels)
            })
            .collect();

        Self {
            target: schema.target.clone(),
            numeric,
            categorical,
        }
    }

    /// Final feature names in network input order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric.clone();
        for vocab in &self.categorical {
            names.extend(vocab.indicator_names());
        }
        names
    }

    pub fn vocabulary(&self, column: &str) -> Option<&CategoryVocabulary> {
        self.categorical.iter().find(|v| v.column == column)
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }

    /// One-hot expand a request. Absent numeric fields are zero,
    /// absent categorical fields take the reference label, and a
    /// label outside the vocabulary is rejected.
    pub fn encode(&self, request: &PredictionRequest) -> Result<EncodedRecord, EstimatorError> {
        if let Some(field) = request.numeric.keys().find(|k| !self.is_numeric(k)) {
            return Err(EstimatorError::UnknownField { field: field.clone() });
        }
        if let Some(field) = request
            .categorical
            .keys()
            .find(|k| self.vocabulary(k).is_none())
        {
            return Err(EstimatorError::UnknownField { field: field.clone() });
        }

        let mut columns: Vec<(String, f64)> = self
            .numeric
            .iter()
            .map(|name| (name.clone(), request.numeric_value(name)))
            .collect();

        for vocab in &self.categorical {
            let Some(reference) = vocab.reference() else { continue };
            let label = request.category(&vocab.column).unwrap_or(reference);

            if !vocab.contains(label) {
                return Err(EstimatorError::UnknownCategory {
                    column:  vocab.column.clone(),
                    value:   label.to_string(),
                    allowed: vocab.labels.clone(),
                });
            }
            if label != reference {
                columns.push((indicator_name(&vocab.column, label), 1.0));
            }
        }

        Ok(EncodedRecord { columns })
    }

    /// Build a request from one complete table row, returning it
    /// together with the row's target value.
    pub fn request_from_row(
        &self,
        headers: &[String],
        row:     &[&str],
    ) -> Result<(PredictionRequest, f64), EstimatorError> {
        let mut request = PredictionRequest::new();
        for name in &self.numeric {
            request = request.with_numeric(name.clone(), number_cell(headers, row, name)?);
        }
        for vocab in &self.categorical {
            request = request.with_category(
                vocab.column.clone(),
                text_cell(headers, row, &vocab.column)?,
            );
        }

        Ok((request, number_cell(headers, row, &self.target)?))
    }

    /// Describe differences between this scheme and `other`
    /// (an independently derived one). Empty means consistent.
    pub fn drift(&self, other: &EncodingScheme) -> Vec<String> {
        let mut notes = Vec::new();

        if self.numeric != other.numeric {
            notes.push(format!(
                "numeric columns differ: {:?} vs {:?}",
                self.numeric, other.numeric
            ));
        }

        for vocab in &self.categorical {
            match other.vocabulary(&vocab.column) {
                None => notes.push(format!("column '{}' is missing", vocab.column)),
                Some(theirs) if theirs.labels != vocab.labels => notes.push(format!(
                    "labels of '{}' differ: {:?} vs {:?}",
                    vocab.column, vocab.labels, theirs.labels
                )),
                Some(_) => {}
            }
        }
        for theirs in &other.categorical {
            if self.vocabulary(&theirs.column).is_none() {
                notes.push(format!("column '{}' is new", theirs.column));
            }
        }

        notes
    }
}

fn text_cell<'r>(headers: &[String], row: &[&'r str], name: &str) -> Result<&'r str, EstimatorError> {
    headers
        .iter()
        .position(|h| h == name)
        .and_then(|i| row.get(i).copied())
        .ok_or_else(|| EstimatorError::UnknownField { field: name.to_string() })
}

fn number_cell(headers: &[String], row: &[&str], name: &str) -> Result<f64, EstimatorError> {
    let raw = text_cell(headers, row, name)?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EstimatorError::MalformedNumber {
            field: name.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme() -> EncodingScheme {
        EncodingScheme {
            target:      "price".into(),
            numeric:     vec!["livingArea".into(), "age".into()],
            categorical: vec![
                CategoryVocabulary::new(
                    "heating",
                    ["hot air", "gas", "electric", "gas"].map(String::from),
                ),
                CategoryVocabulary::new("centralAir", ["Yes", "No"].map(String::from)),
            ],
        }
    }

    #[test]
    fn test_vocabulary_sorted_and_deduplicated() {
        let s = scheme();
        let heating = s.vocabulary("heating").unwrap();
        assert_eq!(heating.labels, vec!["electric", "gas", "hot air"]);
        assert_eq!(heating.reference(), Some("electric"));
    }

    #[test]
    fn test_reference_label_is_dropped() {
        let s = scheme();
        assert_eq!(
            s.vocabulary("heating").unwrap().indicator_names(),
            vec!["heating_gas", "heating_hot air"]
        );
        for vocab in &s.categorical {
            assert_eq!(vocab.indicator_names().len(), vocab.labels.len() - 1);
        }
    }

    #[test]
    fn test_feature_order_numeric_then_indicators() {
        assert_eq!(
            scheme().feature_names(),
            vec!["livingArea", "age", "heating_gas", "heating_hot air", "centralAir_Yes"]
        );
    }

    #[test]
    fn test_reconciled_vector_matches_feature_order_for_every_label() {
        let s     = scheme();
        let order = s.feature_names();
        for label in ["electric", "gas", "hot air"] {
            let req = PredictionRequest::new()
                .with_numeric("livingArea", 2000.0)
                .with_category("heating", label);
            let v = s.encode(&req).unwrap().reconcile(&order);
            assert_eq!(v.len(), order.len());
            assert_eq!(v[0], 2000.0);
            let hot = v[2..4].iter().filter(|x| **x == 1.0).count();
            assert_eq!(hot, usize::from(label != "electric"));
        }
    }

    #[test]
    fn test_gas_sets_only_its_indicator() {
        let s   = scheme();
        let req = PredictionRequest::new()
            .with_category("heating", "gas")
            .with_category("centralAir", "Yes");
        let v = s.encode(&req).unwrap().reconcile(&s.feature_names());
        assert_eq!(v, vec![0.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_all_defaults_encode_without_error() {
        let s = scheme();
        let v = s.encode(&PredictionRequest::new()).unwrap().reconcile(&s.feature_names());
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_reconcile_zero_fills_and_discards() {
        let rec = EncodedRecord {
            columns: vec![("a".into(), 1.5), ("stray".into(), 9.0)],
        };
        let order = vec!["b".to_string(), "a".to_string()];
        assert_eq!(rec.reconcile(&order), vec![0.0, 1.5]);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let req = PredictionRequest::new().with_category("heating", "solar");
        match scheme().encode(&req) {
            Err(EstimatorError::UnknownCategory { column, allowed, .. }) => {
                assert_eq!(column, "heating");
                assert_eq!(allowed.len(), 3);
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let req = PredictionRequest::new().with_numeric("garage", 1.0);
        assert_eq!(
            scheme().encode(&req).unwrap_err(),
            EstimatorError::UnknownField { field: "garage".into() }
        );
    }

    #[test]
    fn test_request_from_row_extracts_target() {
        let s       = scheme();
        let headers = ["price", "livingArea", "heating", "age", "centralAir"].map(String::from);
        let row     = ["150000", "1800", "gas", "12", "No"];
        let (req, price) = s.request_from_row(&headers, &row).unwrap();
        assert_eq!(price, 150000.0);
        assert_eq!(req.numeric_value("age"), 12.0);
        assert_eq!(req.category("heating"), Some("gas"));
    }

    #[test]
    fn test_drift_reports_changed_labels() {
        let a = scheme();
        let mut b = scheme();
        b.categorical[0] = CategoryVocabulary::new("heating", ["gas", "solar"].map(String::from));
        let notes = a.drift(&b);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("heating"));
        assert!(a.drift(&scheme()).is_empty());
    }
}
