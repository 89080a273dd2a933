// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system
// works with: tables of listings, prediction requests, the
// form's field layout, and finished predictions.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

/// An in-memory CSV table with optional (possibly missing) cells
pub mod table;

/// One listing's raw field values, as submitted for prediction
pub mod request;

/// Field names, labels and help text shown by the form
pub mod fields;

/// A finished prediction and its currency rendering
pub mod prediction;

/// Seams implemented by the data and application layers
pub mod traits;
