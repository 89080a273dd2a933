// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, so the
// form session can be driven by the real network or by a
// stand-in, and consolidation can read tables from anywhere.

use anyhow::Result;

use crate::domain::request::PredictionRequest;
use crate::domain::table::Table;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can produce raw listing tables.
///
/// Implementations:
///   - CsvLoader → every `*.csv` file in a directory
pub trait TableSource {
    /// Load all available tables. An empty Vec means nothing was found.
    fn load_all(&self) -> Result<Vec<Table>>;
}

// ─── PricePredictor ───────────────────────────────────────────────────────────
/// The staged inference pipeline behind one prediction.
///
/// Each stage is its own call so callers can track progress
/// (Encoding → Scaling → Inferring) and report exactly where
/// a request failed.
pub trait PricePredictor {
    /// One-hot encode the request and reconcile it onto the
    /// persisted feature order.
    fn encode(&self, request: &PredictionRequest) -> Result<Vec<f64>>;

    /// Apply the persisted feature scaling.
    fn scale(&self, features: &[f64]) -> Result<Vec<f64>>;

    /// Run the network on one scaled feature vector.
    fn infer(&self, scaled: &[f64]) -> Result<f64>;

    /// Human-readable description of the underlying model.
    fn describe(&self) -> String;
}
