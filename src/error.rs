// ============================================================
// Error taxonomy
// ============================================================
// Typed errors for every failure the pipeline can report.
// Use cases wrap these in anyhow with context; the form layer
// downcasts them to decide what is a recoverable warning.

use thiserror::Error;

/// Errors raised by consolidation, training and inference.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    /// The target column is absent from the dataset.
    #[error("column '{column}' not found in '{path}'; rename the target column in the CSV")]
    MissingTargetColumn { column: String, path: String },

    /// The target column holds non-numeric values.
    #[error("target column '{column}' is not numeric")]
    TargetNotNumeric { column: String },

    /// Consolidation found nothing to read.
    #[error("no CSV files found in '{dir}'")]
    NoInputFiles { dir: String },

    /// After filtering there are no usable rows.
    #[error("dataset '{path}' has no complete rows")]
    EmptyDataset { path: String },

    /// A numeric field could not be parsed.
    #[error("field '{field}' expects a number, got '{value}'")]
    MalformedNumber { field: String, value: String },

    /// A categorical label outside the training vocabulary.
    #[error("'{value}' is not a known value for '{column}' (allowed: {})", .allowed.join(", "))]
    UnknownCategory {
        column: String,
        value: String,
        allowed: Vec<String>,
    },

    /// A field name that the trained schema does not know.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// Required measurements were left at zero.
    #[error("incomplete data: {} must be greater than 0", .fields.join(" and "))]
    IncompleteData { fields: Vec<String> },

    /// Feature vectors or feature lists disagree.
    #[error("feature mismatch: expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// The persisted scaler and encoding scheme name different features.
    #[error("feature order of the encoding scheme does not match the scaler (first difference at position {position})")]
    FeatureOrderMismatch { position: usize },

    /// Prediction requested while running without artifacts.
    #[error("the model is not loaded (demo mode)")]
    ModelNotLoaded,

    /// The network produced NaN or infinity.
    #[error("the network produced a non-finite prediction")]
    NonFinitePrediction,
}

impl EstimatorError {
    /// True for errors caused by user input that the form can
    /// report as a warning and let the user correct.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedNumber { .. }
                | Self::UnknownCategory { .. }
                | Self::UnknownField { .. }
                | Self::IncompleteData { .. }
        )
    }
}
